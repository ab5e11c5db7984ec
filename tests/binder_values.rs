//! End-to-end binding scenarios through the full app pipeline.

mod common;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use argflow::bind::{EnvVarSource, FixedPipe};
use argflow::exit_code;
use argflow::model::Operand;
use argflow::pipeline::Invocation;
use argflow::{App, Command, CommandHandler, OptionDef, TypedValue};
use common::{calculator_app, capture_sink, init_tracing, list_option, rest_operand};

// =============================================================================
// CALCULATOR SCENARIOS
// =============================================================================

#[test]
fn add_binds_operands_and_default_option() {
    init_tracing();
    let (_, sink) = capture_sink();
    let (app, results) = calculator_app(sink);

    assert_eq!(app.run(["add", "2", "3"]), exit_code::SUCCESS);
    assert_eq!(*results.borrow(), vec!["2 + 3 = 5"]);
}

#[test]
fn add_with_explicit_operator() {
    let (_, sink) = capture_sink();
    let (app, results) = calculator_app(sink);

    assert_eq!(app.run(["add", "2", "3", "--op", "*"]), exit_code::SUCCESS);
    assert_eq!(*results.borrow(), vec!["2 * 3 = 6"]);
}

#[test]
fn surplus_operand_is_a_validation_error() {
    let (lines, sink) = capture_sink();
    let (app, results) = calculator_app(sink);

    assert_eq!(app.run(["add", "2", "3", "4"]), exit_code::VALIDATION);
    assert!(results.borrow().is_empty(), "target must not execute");
    assert_eq!(
        *lines.borrow(),
        vec!["Unrecognized command or argument '4'"]
    );
}

#[test]
fn missing_operands_reported_together() {
    let (lines, sink) = capture_sink();
    let (app, results) = calculator_app(sink);

    assert_eq!(app.run(["add"]), exit_code::VALIDATION);
    assert!(results.borrow().is_empty());
    assert_eq!(*lines.borrow(), vec!["'x' is required", "'y' is required"]);
}

#[test]
fn type_errors_for_both_operands_in_one_pass() {
    let (lines, sink) = capture_sink();
    let (app, _) = calculator_app(sink);

    assert_eq!(app.run(["add", "two", "three"]), exit_code::VALIDATION);
    let lines = lines.borrow();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("'x'") && lines[0].contains("two"));
    assert!(lines[1].contains("'y'") && lines[1].contains("three"));
}

// =============================================================================
// VALUE SPLITTING
// =============================================================================

struct ListEcho {
    seen: Rc<RefCell<Vec<String>>>,
}

impl CommandHandler for ListEcho {
    fn execute(&self, invocation: &Invocation<'_, '_>) -> anyhow::Result<i32> {
        let items = invocation
            .values("list")
            .unwrap_or_default()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        self.seen.borrow_mut().extend(items);
        Ok(0)
    }
}

#[test]
fn colon_split_option_binds_each_piece() {
    let seen: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
    let out = seen.clone();
    let tree = Command::build("colon")
        .executable("colon")
        .option(list_option("list").split(':'))
        .finish()
        .unwrap();
    let app = App::builder(tree)
        .handler("colon", move || Rc::new(ListEcho { seen: out.clone() }))
        .build()
        .unwrap();

    assert_eq!(app.run(["--list", "one:two:three"]), exit_code::SUCCESS);
    assert_eq!(*seen.borrow(), vec!["one", "two", "three"]);
}

// =============================================================================
// CLUBBED FLAGS END TO END
// =============================================================================

#[test]
fn clubbed_flags_bind_both_true() {
    struct Flags {
        seen: Rc<RefCell<Vec<(bool, bool)>>>,
    }
    impl CommandHandler for Flags {
        fn execute(&self, invocation: &Invocation<'_, '_>) -> anyhow::Result<i32> {
            self.seen
                .borrow_mut()
                .push((invocation.flag("all"), invocation.flag("brief")));
            Ok(0)
        }
    }
    let seen: Rc<RefCell<Vec<(bool, bool)>>> = Rc::new(RefCell::new(Vec::new()));
    let out = seen.clone();
    let tree = Command::build("ls")
        .executable("ls")
        .option(OptionDef::flag("all", 'a'))
        .option(OptionDef::flag("brief", 'b'))
        .finish()
        .unwrap();
    let app = App::builder(tree)
        .handler("ls", move || Rc::new(Flags { seen: out.clone() }))
        .build()
        .unwrap();

    assert_eq!(app.run(["-ab"]), exit_code::SUCCESS);
    assert_eq!(*seen.borrow(), vec![(true, true)]);
}

// =============================================================================
// DEFAULT SOURCES
// =============================================================================

#[test]
fn env_var_default_feeds_missing_option() {
    struct PortEcho {
        seen: Rc<RefCell<Vec<i64>>>,
    }
    impl CommandHandler for PortEcho {
        fn execute(&self, invocation: &Invocation<'_, '_>) -> anyhow::Result<i32> {
            self.seen.borrow_mut().push(invocation.int("port").unwrap_or(-1));
            Ok(0)
        }
    }
    let seen: Rc<RefCell<Vec<i64>>> = Rc::new(RefCell::new(Vec::new()));
    let out = seen.clone();
    let tree = Command::build("serve")
        .executable("serve")
        .option(OptionDef::new("port", "int").env_key("SERVE_PORT").default("8080"))
        .finish()
        .unwrap();

    let mut vars = BTreeMap::new();
    vars.insert("SERVE_PORT".to_string(), "9090".to_string());
    let app = App::builder(tree)
        .handler("serve", move || Rc::new(PortEcho { seen: out.clone() }))
        .default_source(Box::new(EnvVarSource::from_map(vars)))
        .build()
        .unwrap();

    assert_eq!(app.run(Vec::<String>::new()), exit_code::SUCCESS);
    assert_eq!(*seen.borrow(), vec![9090]);
}

// =============================================================================
// PIPED INPUT
// =============================================================================

#[test]
fn piped_lines_append_to_unbounded_operand() {
    struct Echo {
        seen: Rc<RefCell<Vec<String>>>,
    }
    impl CommandHandler for Echo {
        fn execute(&self, invocation: &Invocation<'_, '_>) -> anyhow::Result<i32> {
            let values = invocation
                .values("files")
                .unwrap_or_default()
                .iter()
                .map(ToString::to_string);
            self.seen.borrow_mut().extend(values);
            Ok(0)
        }
    }
    let seen: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
    let out = seen.clone();
    let tree = Command::build("cat")
        .executable("cat")
        .operand(rest_operand("files"))
        .finish()
        .unwrap();
    let app = App::builder(tree)
        .handler("cat", move || Rc::new(Echo { seen: out.clone() }))
        .piped_input(Box::new(FixedPipe::new(vec![
            "from-pipe-1".into(),
            "from-pipe-2".into(),
        ])))
        .build()
        .unwrap();

    assert_eq!(app.run(["argv-file"]), exit_code::SUCCESS);
    assert_eq!(*seen.borrow(), vec!["argv-file", "from-pipe-1", "from-pipe-2"]);
}

// =============================================================================
// TYPED VALUES THROUGH THE INVOCATION API
// =============================================================================

#[test]
fn typed_values_arrive_as_declared() {
    struct Check;
    impl CommandHandler for Check {
        fn execute(&self, invocation: &Invocation<'_, '_>) -> anyhow::Result<i32> {
            assert_eq!(
                invocation.values("ratio"),
                Some(&[TypedValue::Float(2.5)][..])
            );
            assert!(invocation.flag("loud"));
            Ok(0)
        }
    }
    let tree = Command::build("mix")
        .executable("mix")
        .operand(Operand::new("ratio", "float"))
        .option(OptionDef::flag("loud", 'l'))
        .finish()
        .unwrap();
    let app = App::builder(tree)
        .handler("mix", || Rc::new(Check))
        .build()
        .unwrap();
    assert_eq!(app.run(["2.5", "--loud"]), exit_code::SUCCESS);
}
