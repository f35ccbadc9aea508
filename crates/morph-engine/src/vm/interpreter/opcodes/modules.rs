//! IMPORT resolution
//!
//! A name resolves, in order, against native modules, already-loaded
//! modules, and finally `<module_dir>/<name>.mvm`. A file module runs as a
//! module-initialization frame on the same loop; its RET publishes the
//! locals mapping to the importer.

use crate::bytecode::Module;
use crate::vm::defaults::MODULE_EXTENSION;
use crate::vm::interpreter::execution::OpcodeResult;
use crate::vm::interpreter::Interpreter;
use crate::vm::stack::{Frame, FrameKind};
use crate::vm::value::Value;
use crate::vm::VmError;
use tracing::{debug, warn};

impl Interpreter {
    pub(in crate::vm::interpreter) fn exec_import(&mut self, arg: Value) -> OpcodeResult {
        let Some(name) = arg.as_str().map(str::to_string) else {
            warn!(arg = %arg.repr(), "IMPORT expects a module name");
            self.push(Value::Nil);
            return OpcodeResult::Continue;
        };

        if let Some(native) = self.native_modules.get(&name) {
            let exports = match self.modules.get(&name) {
                Some(cached) => cached,
                None => {
                    let exports = native.to_value();
                    debug!(module = %name, "loaded native module");
                    self.modules.register(name.as_str(), exports.clone());
                    exports
                }
            };
            self.push(exports);
            return OpcodeResult::Continue;
        }

        if let Some(exports) = self.modules.get(&name) {
            self.push(exports);
            return OpcodeResult::Continue;
        }

        if self.modules.is_loading(&name) {
            warn!(module = %name, "circular import while module is initializing");
            self.push(Value::Nil);
            return OpcodeResult::Continue;
        }

        let path = self
            .options
            .module_dir
            .join(format!("{}.{}", name, MODULE_EXTENSION));
        let module = match Module::from_file(&path) {
            Ok(module) => module,
            Err(e) => return OpcodeResult::Error(VmError::Module(e)),
        };

        debug!(module = %name, path = %path.display(), "initializing module");
        self.modules.begin_loading(name.as_str());
        let frame = Frame::with_kind(module.code, FrameKind::Module(name.clone()));
        let result = self.push_frame(frame);
        if matches!(result, OpcodeResult::Error(_)) {
            self.modules.abort_loading(&name);
        }
        result
    }
}
