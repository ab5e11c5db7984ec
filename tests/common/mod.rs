//! Shared test utilities: capture sinks, sample trees, recording handlers.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Once;

use argflow::model::{BooleanMode, Operand};
use argflow::pipeline::Invocation;
use argflow::{App, Arity, Command, CommandHandler, NextStep, OptionDef};

static INIT: Once = Once::new();

/// Install the env-filter subscriber once for the whole test binary.
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A sink that collects emitted lines for assertions.
pub fn capture_sink() -> (Rc<RefCell<Vec<String>>>, impl Fn(&str) + 'static) {
    let lines = Rc::new(RefCell::new(Vec::new()));
    let writer = lines.clone();
    (lines, move |text: &str| {
        writer.borrow_mut().push(text.to_string())
    })
}

/// Handler that records invocations and returns a fixed code.
pub struct Recording {
    pub log: Rc<RefCell<Vec<String>>>,
    pub code: i32,
}

impl CommandHandler for Recording {
    fn execute(&self, invocation: &Invocation<'_, '_>) -> anyhow::Result<i32> {
        self.log
            .borrow_mut()
            .push(format!("execute {}", invocation.command().name()));
        Ok(self.code)
    }

    fn intercept(
        &self,
        invocation: &Invocation<'_, '_>,
        next: NextStep<'_, '_>,
    ) -> anyhow::Result<i32> {
        self.log
            .borrow_mut()
            .push(format!("enter {}", invocation.command().name()));
        let code = next.call()?;
        self.log
            .borrow_mut()
            .push(format!("leave {}", invocation.command().name()));
        Ok(code)
    }
}

/// The calculator tree used across suites:
/// `calc -> add(x:int, y:int, --op:string="+")`.
pub fn calculator_tree() -> Command {
    Command::build("calc")
        .subcommand(
            Command::build("add")
                .executable("math")
                .operand(Operand::new("x", "int"))
                .operand(Operand::new("y", "int"))
                .option(OptionDef::new("op", "string").default("+"))
                .finish()
                .unwrap(),
        )
        .finish()
        .unwrap()
}

/// Calculator app plus the list its handler writes results into.
pub fn calculator_app(sink: impl Fn(&str) + 'static) -> (App, Rc<RefCell<Vec<String>>>) {
    let results: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
    let out = results.clone();
    let app = App::builder(calculator_tree())
        .handler("math", move || Rc::new(Math { out: out.clone() }))
        .output(sink)
        .build()
        .unwrap();
    (app, results)
}

pub struct Math {
    out: Rc<RefCell<Vec<String>>>,
}

impl CommandHandler for Math {
    fn execute(&self, invocation: &Invocation<'_, '_>) -> anyhow::Result<i32> {
        let x = invocation.int("x").unwrap_or(0);
        let y = invocation.int("y").unwrap_or(0);
        let op = invocation.string("op").unwrap_or_else(|| "+".into());
        let value = match op.as_str() {
            "*" => x * y,
            "-" => x - y,
            _ => x + y,
        };
        self.out.borrow_mut().push(format!("{x} {op} {y} = {value}"));
        Ok(0)
    }
}

/// An unbounded string operand.
pub fn rest_operand(name: &str) -> Operand {
    Operand::new(name, "string").arity(Arity::zero_or_more())
}

/// A multi-value explicit option.
pub fn list_option(name: &str) -> OptionDef {
    OptionDef::new(name, "string")
        .arity(Arity::one_or_more())
        .boolean_mode(BooleanMode::Explicit)
}
