/// Sub-render states: self-contained pieces of shader functionality that
/// extend a program set, and the factories that build them from material
/// script directives.

use std::any::Any;
use super::script::{PropertyNode, ScriptCompiler, ScriptTranslator};
use super::shader_graph::{MaterialPass, ProgramSet};

/// A unit of shader functionality
///
/// The shader generator drives the steps in order:
/// `pre_add_to_render_state`, `resolve_parameters`, `resolve_dependencies`,
/// `add_function_invocations`; `update_gpu_program_params` runs per draw.
pub trait SubRenderState: Any + Send {
    /// Unique type name
    fn type_name(&self) -> &'static str;

    /// Position among the other states of a render state
    fn execution_order(&self) -> i32;

    /// Copy the configuration of `other` (a state of the same type)
    fn copy_from(&mut self, other: &dyn SubRenderState);

    /// Prepare the destination pass (e.g. add texture units)
    fn pre_add_to_render_state(&mut self, _dst_pass: &mut MaterialPass) -> bool {
        true
    }

    fn resolve_parameters(&mut self, programs: &mut ProgramSet) -> bool;

    fn resolve_dependencies(&mut self, programs: &mut ProgramSet) -> bool;

    fn add_function_invocations(&mut self, programs: &mut ProgramSet) -> bool;

    fn update_gpu_program_params(&self, _programs: &mut ProgramSet) {}

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Builds sub-render states of one type
pub trait SubRenderStateFactory {
    fn type_name(&self) -> &'static str;

    /// Fresh, unconfigured instance
    fn create_instance_impl(&self) -> Box<dyn SubRenderState>;

    /// Configure (creating if needed) an instance from a script property
    ///
    /// Returns `None` for properties this factory does not handle, and for
    /// malformed ones after recording an error in `compiler`.
    fn create_instance<'t>(
        &self,
        compiler: &mut ScriptCompiler,
        prop: &PropertyNode,
        translator: &'t mut ScriptTranslator,
    ) -> Option<&'t mut dyn SubRenderState>;

    /// The translator's existing instance of this type, or a new one
    fn create_or_retrieve_instance<'t>(
        &self,
        translator: &'t mut ScriptTranslator,
    ) -> &'t mut dyn SubRenderState {
        translator.get_or_insert_with(self.type_name(), || self.create_instance_impl())
    }
}
