//! Reference stack machine for running generated artifacts in tests.
#![allow(dead_code)]
use logo::compile::{Artifact, Flag, Instruction, Value};
use smol_str::SmolStr;
use std::{cmp::Ordering, collections::HashMap, collections::VecDeque};

/// Upper bound on executed instructions, so a broken loop fails the test.
const STEP_LIMIT: usize = 100_000;

pub fn compile(source: &str) -> Artifact {
    match logo::compile_str(source) {
        Ok(artifact) => artifact,
        Err(err) => panic!("{}\n{}", err, source),
    }
}

pub fn run(source: &str) -> Machine {
    let artifact = compile(source);
    let mut machine = Machine::new(&artifact);
    machine.execute();
    machine
}

struct Frame {
    function: SmolStr,
    pc: usize,
}

pub struct Machine {
    code: HashMap<SmolStr, Vec<Instruction>>,
    labels: HashMap<SmolStr, (SmolStr, usize)>,
    entry: SmolStr,
    pub memory: HashMap<SmolStr, Value>,
    stack: Vec<Value>,
    ordering: Option<Ordering>,
    pub input: VecDeque<f64>,
    pub output: Vec<Value>,
    /// Heading and distance of every turtle move.
    pub moves: Vec<(f64, f64)>,
    pub position: Option<(f64, f64)>,
    pub pen: bool,
    pub clears: usize,
}

impl Machine {
    pub fn new(artifact: &Artifact) -> Self {
        let mut code = HashMap::new();
        let mut labels = HashMap::new();

        for (name, function) in &artifact.functions {
            let flat = function.flattened();
            for (index, instruction) in flat.iter().enumerate() {
                if let Instruction::Label { name: label, .. } = instruction {
                    let previous = labels.insert(label.clone(), (name.clone(), index));
                    assert!(previous.is_none(), "duplicate label {}", label);
                }
            }
            code.insert(name.clone(), flat);
        }

        Machine {
            code,
            labels,
            entry: artifact.entry.clone(),
            memory: artifact.variables.clone().into_iter().collect(),
            stack: vec![],
            ordering: None,
            input: VecDeque::new(),
            output: vec![],
            moves: vec![],
            position: None,
            pen: false,
            clears: 0,
        }
    }

    pub fn number(&self, slot: &str) -> f64 {
        match self.memory.get(slot) {
            Some(Value::Number(value)) => *value,
            other => panic!("slot {} holds {:?}", slot, other),
        }
    }

    pub fn output_numbers(&self) -> Vec<f64> {
        self.output.iter().map(as_number).collect()
    }

    fn pop(&mut self) -> Value {
        self.stack.pop().expect("stack underflow")
    }

    fn pop_number(&mut self) -> f64 {
        let value = self.pop();
        as_number(&value)
    }

    fn jump(&self, label: &SmolStr, frame: &mut Frame) {
        let (function, index) = self.labels.get(label).unwrap_or_else(|| panic!("unknown label {}", label));
        assert_eq!(function, &frame.function, "jump out of function to {}", label);
        frame.pc = *index;
    }

    pub fn execute(&mut self) {
        use Instruction as I;

        let mut frames = vec![Frame {
            function: self.entry.clone(),
            pc: 0,
        }];

        for _ in 0..STEP_LIMIT {
            let mut frame = match frames.pop() {
                Some(frame) => frame,
                None => return,
            };
            let instruction = self.code[&frame.function]
                .get(frame.pc)
                .cloned()
                .unwrap_or_else(|| panic!("fell off the end of {}", frame.function));
            frame.pc += 1;

            match instruction {
                I::Load(slot) => {
                    let value = self.memory.get(&slot).cloned().unwrap_or_else(|| panic!("no slot {}", slot));
                    self.stack.push(value);
                }
                I::Push(value) => self.stack.push(value),
                I::Pop => {
                    self.pop();
                }
                I::Dup => {
                    let value = self.stack.last().cloned().expect("stack underflow");
                    self.stack.push(value);
                }
                I::Store(slot) => {
                    let value = self.pop();
                    self.memory.insert(slot, value);
                }
                I::Cmp(slot) => {
                    let value = self.pop_number();
                    let other = self.number(&slot);
                    self.ordering = value.partial_cmp(&other);
                }
                I::Jump(label) => self.jump(&label, &mut frame),
                I::JumpZero(label) if self.ordering == Some(Ordering::Equal) => self.jump(&label, &mut frame),
                I::JumpNotZero(label) if self.ordering != Some(Ordering::Equal) => self.jump(&label, &mut frame),
                I::JumpMore(label) if self.ordering == Some(Ordering::Greater) => self.jump(&label, &mut frame),
                I::JumpLess(label) if self.ordering == Some(Ordering::Less) => self.jump(&label, &mut frame),
                I::JumpZero(_) | I::JumpNotZero(_) | I::JumpMore(_) | I::JumpLess(_) => {}
                I::Add | I::Sub | I::Mul | I::Div | I::Pow | I::And | I::Or => {
                    let right = self.pop_number();
                    let left = self.pop_number();
                    let result = match instruction {
                        I::Add => left + right,
                        I::Sub => left - right,
                        I::Mul => left * right,
                        I::Div => left / right,
                        I::Pow => left.powf(right),
                        I::And => truth(left != 0.0 && right != 0.0),
                        _ => truth(left != 0.0 || right != 0.0),
                    };
                    self.stack.push(Value::Number(result));
                }
                I::Rand => self.stack.push(Value::Number(4.0)),
                I::Not => {
                    let value = self.pop_number();
                    self.stack.push(Value::Number(truth(value == 0.0)));
                }
                I::Trunc => {
                    let value = self.pop_number();
                    self.stack.push(Value::Number(value.trunc()));
                }
                I::Read => {
                    let value = self.input.pop_front().expect("read with no input");
                    self.stack.push(Value::Number(value));
                }
                I::Write => {
                    let count = self.pop_number() as usize;
                    let at = self.stack.len() - count;
                    let values = self.stack.split_off(at);
                    self.output.extend(values);
                }
                I::MoveTo => {
                    let y = self.pop_number();
                    let x = self.pop_number();
                    self.position = Some((x, y));
                }
                I::Call(name) => match name.as_str() {
                    "MOVE" => {
                        let distance = self.pop_number();
                        let heading = self.pop_number();
                        self.moves.push((heading, distance));
                    }
                    "CLRSCR" => self.clears += 1,
                    _ => {
                        assert!(self.code.contains_key(&name), "call to unknown function {}", name);
                        frames.push(frame);
                        frames.push(Frame { function: name.clone(), pc: 0 });
                        continue;
                    }
                },
                I::Set(Flag::Pen) => self.pen = true,
                I::Unset(Flag::Pen) => self.pen = false,
                I::Set(_) | I::Unset(_) => {}
                I::Return => continue,
                I::Label { .. } => {}
            }

            frames.push(frame);
        }

        panic!("step limit exceeded");
    }
}

fn truth(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

fn as_number(value: &Value) -> f64 {
    match value {
        Value::Number(number) => *number,
        Value::Str(text) => panic!("expected a number, found '{}'", text),
    }
}
