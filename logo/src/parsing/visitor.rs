use super::{
    expr::Expr,
    func::DeclareFunction,
    stmts::{Assignment, IfStatement, InvokeFunction, Stmt, WhileStatement},
};

pub trait AstVisitor {
    type Output;
    fn assignment(&mut self, stmt: &Assignment) -> Self::Output;
    fn if_stmt(&mut self, stmt: &IfStatement) -> Self::Output;
    fn while_stmt(&mut self, stmt: &WhileStatement) -> Self::Output;
    fn declare_function(&mut self, func: &DeclareFunction) -> Self::Output;
    fn invoke_function(&mut self, invoke: &InvokeFunction) -> Self::Output;
    fn expr(&mut self, expr: &Expr) -> Self::Output;

    #[inline]
    fn stmt(&mut self, stmt: &Stmt) -> Self::Output {
        match stmt {
            Stmt::Assign(stmt) => self.assignment(stmt),
            Stmt::If(stmt) => self.if_stmt(stmt),
            Stmt::While(stmt) => self.while_stmt(stmt),
            Stmt::Func(func) => self.declare_function(func),
            Stmt::Invoke(invoke) => self.invoke_function(invoke),
        }
    }
}
