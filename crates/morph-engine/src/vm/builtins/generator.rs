//! Generator yield and resume
//!
//! A yield detaches the running frame into a [`Generator`] handle and hands
//! `[value, handle]` to the frame below. A resume pushes the frame back and
//! delivers the resume input as the result of the suspended yield call.

use super::{arg, done};
use crate::vm::interpreter::{Interpreter, NativeCallResult};
use crate::vm::object::Generator;
use crate::vm::value::Value;
use std::rc::Rc;
use tracing::{trace, warn};

/// `_gen_yield(value)`
pub fn yield_value(interp: &mut Interpreter, argc: usize) -> NativeCallResult {
    let args = interp.pop_args(argc);
    let value = arg(&args, 0);

    // The root frame has nobody to yield to
    if interp.frames.len() <= 1 {
        return done(interp, Value::Nil);
    }
    let Some(frame) = interp.frames.pop() else {
        return done(interp, Value::Nil);
    };

    trace!(function = %frame.code.name, "yield");
    let handle = Value::Generator(Rc::new(Generator::new(frame)));
    interp.push(Value::list(vec![value, handle]));
    NativeCallResult::Detached
}

/// `_gen_resume(handle, input)`
///
/// Pushes nothing on success; the generator's next yield or return delivers
/// the value. Consumed or invalid handles yield Nil.
pub fn resume(interp: &mut Interpreter, argc: usize) -> NativeCallResult {
    let args = interp.pop_args(argc);
    let Value::Generator(generator) = arg(&args, 0) else {
        return done(interp, Value::Nil);
    };
    let limit = interp.options.max_call_depth;
    if interp.frames.len() >= limit {
        warn!(limit, "generator resume exceeds call depth");
        return done(interp, Value::Nil);
    }
    let Some(mut frame) = generator.take() else {
        return done(interp, Value::Nil);
    };

    trace!(function = %frame.code.name, "resume");
    frame.push(arg(&args, 1));
    interp.frames.push(frame);
    NativeCallResult::Done
}
