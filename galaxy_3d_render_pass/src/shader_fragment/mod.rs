/// Shader fragment module - sub-render states the shader generator composes
/// into programs, with their material script factories

pub mod shader_graph;
pub mod script;
pub mod sub_render_state;
pub mod triplanar_texturing;

pub use shader_graph::*;
pub use script::{
    get_float, get_string, AbstractNode, CompileError, CompileErrorCode, PropertyNode,
    ScriptCompiler, ScriptTranslator,
};
pub use sub_render_state::{SubRenderState, SubRenderStateFactory};
pub use triplanar_texturing::{
    TriplanarTexturing, TriplanarTexturingFactory, SGX_FUNC_TRIPLANAR_TEXTURING,
    SGX_LIB_TRIPLANAR_TEXTURING, TRIPLANAR_DIRECTIVE, TRIPLANAR_TEXTURING_TYPE,
};
