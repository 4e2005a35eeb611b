//! Graded-run path: execute learner code inside an embedded RustPython VM.
//!
//! Each call builds a fresh interpreter without the stdlib, installs a
//! restricted `__builtins__` mapping holding only the allowlisted names,
//! redirects `sys.stdout`/`sys.stderr` into capture buffers, runs the code,
//! and reads the resulting top-level bindings back out as [`Value`]s. The
//! VM is dropped at the end of the call, so no redirection or scope state
//! can leak into a later run.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use rustpython_vm::{
    AsObject, Interpreter, PyObjectRef, PyResult, Settings, TryFromObject, VirtualMachine,
    builtins::PyBaseExceptionRef,
    compiler::Mode,
    function::FuncArgs,
    scope::Scope,
};
use serde_json::Value as JsonValue;
use tracing::{debug, instrument};

use crate::analysis::{AnalysisError, SafetyViolation, strict};
use crate::value::Value;

/// The builtin names learner code may use on the graded path.
///
/// Everything else is absent from `__builtins__`, so a disallowed call
/// fails with an ordinary `NameError` rather than a special-cased message.
pub const ALLOWED_BUILTINS: &[&str] = &[
    "abs",
    "bool",
    "enumerate",
    "float",
    "int",
    "len",
    "list",
    "map",
    "max",
    "min",
    "print",
    "range",
    "round",
    "str",
    "sum",
];

/// Successful execution: what the code left behind.
#[derive(Debug, Clone)]
pub struct Execution {
    /// Top-level bindings, dunder names excluded.
    pub bindings: BTreeMap<String, Value>,
    pub stdout: String,
    pub stderr: String,
}

/// Why a graded execution produced no bindings.
#[derive(Debug, Clone)]
pub enum InterpError {
    /// The strict analyzer refused the code before the VM saw it.
    Violation(SafetyViolation),
    Syntax {
        message: String,
        line: usize,
        column: usize,
    },
    /// The code raised. Output captured up to the raise is preserved.
    Fault {
        /// Python exception class name, e.g. `ZeroDivisionError`.
        kind: String,
        message: String,
        traceback: String,
        stdout: String,
        stderr: String,
    },
}

/// Run `code` with `setup` bound in its scope, under the strict policy.
#[instrument(skip_all, fields(code_len = code.len()))]
pub fn execute(code: &str, setup: &BTreeMap<String, JsonValue>) -> Result<Execution, InterpError> {
    match strict::analyze(code) {
        Ok(()) => {}
        Err(AnalysisError::Syntax {
            message,
            line,
            column,
        }) => {
            return Err(InterpError::Syntax {
                message,
                line,
                column,
            });
        }
        Err(AnalysisError::Violation(violation)) => {
            debug!(rule = %violation.rule, "interpreter refused code");
            return Err(InterpError::Violation(violation));
        }
    }

    let capture = Capture::default();
    let interp = Interpreter::without_stdlib(Settings::default());
    interp.enter(|vm| {
        install_output_capture(vm, &capture);

        let globals = vm.ctx.new_dict();
        let _ = globals.set_item("__builtins__", restricted_builtins(vm), vm);
        for (name, value) in setup {
            let _ = globals.set_item(name.as_str(), json_to_py(vm, value), vm);
        }
        let scope = Scope::with_builtins(None, globals.clone(), vm);

        let code_obj = match vm.compile(code, Mode::Exec, "<exercise>".to_owned()) {
            Ok(code_obj) => code_obj,
            Err(err) => {
                let (line, column) = err.python_location();
                return Err(InterpError::Syntax {
                    message: err.to_string(),
                    line: line as usize,
                    column: column as usize,
                });
            }
        };

        match vm.run_code_obj(code_obj, scope) {
            Ok(_) => {
                let bindings = match collect_bindings(vm, globals.into()) {
                    Ok(bindings) => bindings,
                    Err(_) => {
                        debug!("binding extraction failed, returning empty scope");
                        BTreeMap::new()
                    }
                };
                let (stdout, stderr) = capture.snapshot();
                Ok(Execution {
                    bindings,
                    stdout,
                    stderr,
                })
            }
            Err(exc) => {
                let (stdout, stderr) = capture.snapshot();
                Err(fault(vm, &exc, stdout, stderr))
            }
        }
    })
}

/// Shared stdout/stderr sinks handed to the writer objects.
#[derive(Debug, Clone, Default)]
struct Capture {
    stdout: Arc<Mutex<String>>,
    stderr: Arc<Mutex<String>>,
}

impl Capture {
    fn snapshot(&self) -> (String, String) {
        let stdout = self.stdout.lock().map(|s| s.clone()).unwrap_or_default();
        let stderr = self.stderr.lock().map(|s| s.clone()).unwrap_or_default();
        (stdout, stderr)
    }
}

fn install_output_capture(vm: &VirtualMachine, capture: &Capture) {
    let stdout = writer_object(vm, Arc::clone(&capture.stdout), "stdout");
    let stderr = writer_object(vm, Arc::clone(&capture.stderr), "stderr");
    let _ = vm.sys_module.set_attr("stdout", stdout, vm);
    let _ = vm.sys_module.set_attr("stderr", stderr, vm);
}

/// Minimal file-like namespace with `write`/`flush` plus the attributes
/// Python code commonly probes on a stream.
fn writer_object(vm: &VirtualMachine, sink: Arc<Mutex<String>>, name: &str) -> PyObjectRef {
    let write_fn = vm.new_function(
        "write",
        move |args: FuncArgs, vm: &VirtualMachine| -> PyResult<PyObjectRef> {
            let data: String = args
                .args
                .first()
                .and_then(|obj| obj.str(vm).ok())
                .map(|s| s.as_str().to_owned())
                .unwrap_or_default();
            if let Ok(mut buffer) = sink.lock() {
                buffer.push_str(&data);
            }
            Ok(vm.ctx.new_int(data.len()).into())
        },
    );
    let flush_fn = vm.new_function(
        "flush",
        move |_args: FuncArgs, vm: &VirtualMachine| -> PyResult<PyObjectRef> {
            Ok(vm.ctx.none())
        },
    );

    let ns = vm.new_module(name, vm.ctx.new_dict(), None);
    let _ = ns.set_attr("write", write_fn, vm);
    let _ = ns.set_attr("flush", flush_fn, vm);
    let _ = ns.set_attr("closed", vm.ctx.new_bool(false), vm);
    let _ = ns.set_attr("encoding", vm.ctx.new_str("utf-8"), vm);
    ns.into()
}

/// Build the `__builtins__` mapping from the allowlist.
fn restricted_builtins(vm: &VirtualMachine) -> PyObjectRef {
    let builtins = vm.ctx.new_dict();
    for name in ALLOWED_BUILTINS {
        match vm.builtins.get_attr(*name, vm) {
            Ok(value) => {
                let _ = builtins.set_item(*name, value, vm);
            }
            Err(_) => debug!(name, "builtin missing from VM, leaving it out"),
        }
    }
    builtins.into()
}

fn json_to_py(vm: &VirtualMachine, value: &JsonValue) -> PyObjectRef {
    match value {
        JsonValue::Null => vm.ctx.none(),
        JsonValue::Bool(b) => vm.ctx.new_bool(*b).into(),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                vm.ctx.new_int(i).into()
            } else {
                vm.ctx.new_float(n.as_f64().unwrap_or(f64::NAN)).into()
            }
        }
        JsonValue::String(s) => vm.ctx.new_str(s.as_str()).into(),
        JsonValue::Array(items) => {
            let elements = items.iter().map(|item| json_to_py(vm, item)).collect();
            vm.ctx.new_list(elements).into()
        }
        JsonValue::Object(map) => {
            let dict = vm.ctx.new_dict();
            for (key, val) in map {
                let _ = dict.set_item(key.as_str(), json_to_py(vm, val), vm);
            }
            dict.into()
        }
    }
}

fn collect_bindings(
    vm: &VirtualMachine,
    globals: PyObjectRef,
) -> PyResult<BTreeMap<String, Value>> {
    let mut bindings = BTreeMap::new();
    let items = vm.call_method(&globals, "items", ())?;
    for pair in vm.extract_elements_with(&items, Ok)? {
        let pair = vm.extract_elements_with(&pair, Ok)?;
        let [key, value] = pair.as_slice() else {
            continue;
        };
        let name = key.str(vm)?.as_str().to_owned();
        if name.starts_with("__") {
            continue;
        }
        bindings.insert(name, py_to_value(vm, value.clone()));
    }
    Ok(bindings)
}

/// Convert a Python object into the closed [`Value`] set.
///
/// Lazy iterables are materialized here; their class name is kept so the
/// checks can tell the learner a conversion happened.
fn py_to_value(vm: &VirtualMachine, obj: PyObjectRef) -> Value {
    if vm.is_none(&obj) {
        return Value::None;
    }
    let types = &vm.ctx.types;
    if obj.fast_isinstance(types.bool_type) {
        return match i64::try_from_object(vm, obj.clone()) {
            Ok(i) => Value::Bool(i != 0),
            Err(_) => opaque(vm, &obj),
        };
    }
    if obj.fast_isinstance(types.int_type) {
        return match i64::try_from_object(vm, obj.clone()) {
            Ok(i) => Value::Int(i),
            Err(_) => opaque(vm, &obj),
        };
    }
    if obj.fast_isinstance(types.float_type) {
        return match f64::try_from_object(vm, obj.clone()) {
            Ok(f) => Value::Float(f),
            Err(_) => opaque(vm, &obj),
        };
    }
    if obj.fast_isinstance(types.str_type) {
        return match obj.str(vm) {
            Ok(s) => Value::Str(s.as_str().to_owned()),
            Err(_) => opaque(vm, &obj),
        };
    }
    if obj.fast_isinstance(types.list_type) || obj.fast_isinstance(types.tuple_type) {
        return match vm.extract_elements_with(&obj, Ok) {
            Ok(items) => Value::List(
                items
                    .into_iter()
                    .map(|item| py_to_value(vm, item))
                    .collect(),
            ),
            Err(_) => opaque(vm, &obj),
        };
    }
    let lazy = obj.fast_isinstance(types.map_type)
        || obj.fast_isinstance(types.range_type)
        || obj.fast_isinstance(types.generator_type)
        || obj.fast_isinstance(types.enumerate_type)
        || obj.fast_isinstance(types.filter_type)
        || obj.fast_isinstance(types.zip_type);
    if lazy {
        let class = obj.class().name().to_string();
        return match vm.extract_elements_with(&obj, Ok) {
            Ok(items) => Value::Lazy {
                class,
                items: items
                    .into_iter()
                    .map(|item| py_to_value(vm, item))
                    .collect(),
            },
            Err(_) => opaque(vm, &obj),
        };
    }
    opaque(vm, &obj)
}

fn opaque(vm: &VirtualMachine, obj: &PyObjectRef) -> Value {
    let repr = obj
        .repr(vm)
        .map(|s| s.as_str().to_owned())
        .unwrap_or_else(|_| "<unrepresentable>".to_owned());
    Value::Opaque(repr)
}

fn fault(
    vm: &VirtualMachine,
    exc: &PyBaseExceptionRef,
    stdout: String,
    stderr: String,
) -> InterpError {
    let kind = exc.class().name().to_string();
    let message = exc
        .as_object()
        .str(vm)
        .map(|s| s.as_str().to_owned())
        .unwrap_or_default();
    let mut traceback = String::new();
    let _ = vm.write_exception(&mut traceback, exc);
    InterpError::Fault {
        kind,
        message,
        traceback,
        stdout,
        stderr,
    }
}
