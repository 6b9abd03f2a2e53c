/// Triplanar texturing: samples three textures projected along the X, Y and
/// Z axes and blends them by the surface normal.
///
/// Script directive (inside a pass's shader generation block):
///
/// ```text
/// triplanarTexturing <blend_x> <blend_y> <blend_z> <texture_x> <texture_y> <texture_z>
/// ```

use std::any::Any;
use glam::Vec3;
use crate::{engine_debug, engine_warn};
use super::script::{
    get_float, get_string, CompileErrorCode, PropertyNode, ScriptCompiler, ScriptTranslator,
};
use super::shader_graph::{
    GpuConstantType, GpuProgramType, MaterialPass, Operand, ParameterContent, ParameterRef,
    ProgramSet, FFP_LIB_COMMON, FFP_LIB_TEXTURING, FFP_PS_TEXTURING, FFP_TEXTURING,
};
use super::sub_render_state::{SubRenderState, SubRenderStateFactory};

pub const TRIPLANAR_TEXTURING_TYPE: &str = "SGX_TriplanarTexturing";
pub const SGX_LIB_TRIPLANAR_TEXTURING: &str = "SGXLib_TriplanarTexturing";
pub const SGX_FUNC_TRIPLANAR_TEXTURING: &str = "SGX_TriplanarTexturing";
pub const TRIPLANAR_DIRECTIVE: &str = "triplanarTexturing";

/// Parameters resolved into the vertex and fragment programs
#[derive(Debug, Clone, PartialEq)]
struct ResolvedParameters {
    vs_in_normal: ParameterRef,
    vs_out_normal: ParameterRef,
    vs_in_position: ParameterRef,
    vs_out_position: ParameterRef,
    ps_in_diffuse: ParameterRef,
    ps_out_diffuse: ParameterRef,
    ps_in_normal: ParameterRef,
    ps_in_position: ParameterRef,
    sampler_from_x: ParameterRef,
    sampler_from_y: ParameterRef,
    sampler_from_z: ParameterRef,
    tp_params: ParameterRef,
}

#[derive(Debug, Clone, Default)]
pub struct TriplanarTexturing {
    parameters: Vec3,
    texture_name_from_x: String,
    texture_name_from_y: String,
    texture_name_from_z: String,
    sampler_index_from_x: u32,
    sampler_index_from_y: u32,
    sampler_index_from_z: u32,
    resolved: Option<ResolvedParameters>,
}

impl TriplanarTexturing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blend parameters uploaded as `gTPParams`
    pub fn set_parameters(&mut self, parameters: Vec3) {
        self.parameters = parameters;
    }

    pub fn parameters(&self) -> Vec3 {
        self.parameters
    }

    pub fn set_texture_names(&mut self, from_x: &str, from_y: &str, from_z: &str) {
        self.texture_name_from_x = from_x.to_string();
        self.texture_name_from_y = from_y.to_string();
        self.texture_name_from_z = from_z.to_string();
    }

    pub fn texture_names(&self) -> [&str; 3] {
        [
            &self.texture_name_from_x,
            &self.texture_name_from_y,
            &self.texture_name_from_z,
        ]
    }

    /// Texture unit indices of the X, Y and Z samplers
    pub fn sampler_indices(&self) -> [u32; 3] {
        [
            self.sampler_index_from_x,
            self.sampler_index_from_y,
            self.sampler_index_from_z,
        ]
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }
}

fn add_texture_unit(dst_pass: &mut MaterialPass, texture_name: &str) -> u32 {
    dst_pass.create_texture_unit_state().texture_name = texture_name.to_string();
    (dst_pass.num_texture_unit_states() - 1) as u32
}

impl SubRenderState for TriplanarTexturing {
    fn type_name(&self) -> &'static str {
        TRIPLANAR_TEXTURING_TYPE
    }

    fn execution_order(&self) -> i32 {
        FFP_TEXTURING
    }

    fn copy_from(&mut self, other: &dyn SubRenderState) {
        if let Some(other) = other.as_any().downcast_ref::<TriplanarTexturing>() {
            self.parameters = other.parameters;
            self.texture_name_from_x = other.texture_name_from_x.clone();
            self.texture_name_from_y = other.texture_name_from_y.clone();
            self.texture_name_from_z = other.texture_name_from_z.clone();
            self.resolved = other.resolved.clone();
        }
    }

    fn pre_add_to_render_state(&mut self, dst_pass: &mut MaterialPass) -> bool {
        self.sampler_index_from_x = add_texture_unit(dst_pass, &self.texture_name_from_x);
        self.sampler_index_from_y = add_texture_unit(dst_pass, &self.texture_name_from_y);
        self.sampler_index_from_z = add_texture_unit(dst_pass, &self.texture_name_from_z);
        true
    }

    fn resolve_parameters(&mut self, programs: &mut ProgramSet) -> bool {
        let vs_main = programs.program_mut(GpuProgramType::Vertex).entry_point_mut();
        let vs_in_normal = vs_main.resolve_input_parameter(ParameterContent::NormalObjectSpace);
        let vs_out_normal = vs_main.resolve_output_texcoord(
            ParameterContent::NormalViewSpace, GpuConstantType::Float3);
        let vs_in_position = vs_main.resolve_input_parameter(ParameterContent::PositionObjectSpace);
        let vs_out_position = vs_main.resolve_output_texcoord(
            ParameterContent::PositionObjectSpace, GpuConstantType::Float4);

        let ps_program = programs.program_mut(GpuProgramType::Fragment);
        let ps_main = ps_program.entry_point_mut();
        let ps_in_diffuse = ps_main.resolve_input_parameter(ParameterContent::ColorDiffuse);
        let ps_in_normal = ps_main.resolve_input_texcoord(
            vs_out_normal.index, vs_out_normal.content, GpuConstantType::Float3);
        let ps_in_position = ps_main.resolve_input_texcoord(
            vs_out_position.index, vs_out_position.content, GpuConstantType::Float4);
        let ps_out_diffuse = ps_main.resolve_output_parameter(ParameterContent::ColorDiffuse);

        let samplers = [
            ("tp_sampler_from_x", self.sampler_index_from_x),
            ("tp_sampler_from_y", self.sampler_index_from_y),
            ("tp_sampler_from_z", self.sampler_index_from_z),
        ];
        let mut resolved_samplers = Vec::with_capacity(samplers.len());
        for (name, index) in samplers {
            match ps_program.resolve_parameter(GpuConstantType::Sampler2D, Some(index), name) {
                Some(sampler) => resolved_samplers.push(sampler),
                None => {
                    engine_warn!("galaxy3d::TriplanarTexturing",
                        "Uniform '{}' already declared with another type", name);
                    return false;
                }
            }
        }

        let Some(tp_params) = ps_program.resolve_parameter(GpuConstantType::Float3, None, "gTPParams") else {
            engine_warn!("galaxy3d::TriplanarTexturing",
                "Uniform 'gTPParams' already declared with another type");
            return false;
        };

        let [sampler_from_x, sampler_from_y, sampler_from_z]: [ParameterRef; 3] =
            match resolved_samplers.try_into() {
                Ok(samplers) => samplers,
                Err(_) => return false,
            };

        self.resolved = Some(ResolvedParameters {
            vs_in_normal,
            vs_out_normal,
            vs_in_position,
            vs_out_position,
            ps_in_diffuse,
            ps_out_diffuse,
            ps_in_normal,
            ps_in_position,
            sampler_from_x,
            sampler_from_y,
            sampler_from_z,
            tp_params,
        });
        true
    }

    fn resolve_dependencies(&mut self, programs: &mut ProgramSet) -> bool {
        let ps_program = programs.program_mut(GpuProgramType::Fragment);
        ps_program.add_dependency(FFP_LIB_TEXTURING);
        ps_program.add_dependency(SGX_LIB_TRIPLANAR_TEXTURING);
        programs.program_mut(GpuProgramType::Vertex).add_dependency(FFP_LIB_COMMON);
        true
    }

    fn add_function_invocations(&mut self, programs: &mut ProgramSet) -> bool {
        let Some(p) = &self.resolved else {
            return false;
        };

        programs
            .program_mut(GpuProgramType::Vertex)
            .entry_point_mut()
            .stage(FFP_PS_TEXTURING)
            .assign(&p.vs_in_normal, &p.vs_out_normal)
            .assign(&p.vs_in_position, &p.vs_out_position);

        programs
            .program_mut(GpuProgramType::Fragment)
            .entry_point_mut()
            .stage(FFP_PS_TEXTURING)
            .call_function(SGX_FUNC_TRIPLANAR_TEXTURING, vec![
                Operand::input(&p.ps_in_diffuse),
                Operand::input(&p.ps_in_normal),
                Operand::input(&p.ps_in_position),
                Operand::input(&p.sampler_from_x),
                Operand::input(&p.sampler_from_y),
                Operand::input(&p.sampler_from_z),
                Operand::input(&p.tp_params),
                Operand::output(&p.ps_out_diffuse),
            ]);
        true
    }

    fn update_gpu_program_params(&self, programs: &mut ProgramSet) {
        if let Some(p) = &self.resolved {
            programs
                .program_mut(GpuProgramType::Fragment)
                .set_float3(&p.tp_params, self.parameters);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// ===== FACTORY =====

#[derive(Debug, Default)]
pub struct TriplanarTexturingFactory;

impl TriplanarTexturingFactory {
    pub fn new() -> Self {
        Self
    }
}

fn invalid_parameters(compiler: &mut ScriptCompiler, prop: &PropertyNode) {
    engine_warn!("galaxy3d::TriplanarTexturing",
        "{}:{}: invalid '{}' parameters", prop.file, prop.line, prop.name);
    compiler.add_error(CompileErrorCode::InvalidParameters, &prop.file, prop.line);
}

impl SubRenderStateFactory for TriplanarTexturingFactory {
    fn type_name(&self) -> &'static str {
        TRIPLANAR_TEXTURING_TYPE
    }

    fn create_instance_impl(&self) -> Box<dyn SubRenderState> {
        Box::new(TriplanarTexturing::new())
    }

    fn create_instance<'t>(
        &self,
        compiler: &mut ScriptCompiler,
        prop: &PropertyNode,
        translator: &'t mut ScriptTranslator,
    ) -> Option<&'t mut dyn SubRenderState> {
        if prop.name != TRIPLANAR_DIRECTIVE {
            return None;
        }
        if prop.values.len() != 6 {
            invalid_parameters(compiler, prop);
            return None;
        }

        let state = self.create_or_retrieve_instance(translator);

        let mut parameters = [0.0f32; 3];
        for (value, node) in parameters.iter_mut().zip(&prop.values[..3]) {
            match get_float(node) {
                Some(parsed) => *value = parsed,
                None => {
                    invalid_parameters(compiler, prop);
                    return None;
                }
            }
        }
        if let Some(triplanar) = state.as_any_mut().downcast_mut::<TriplanarTexturing>() {
            triplanar.set_parameters(Vec3::from_array(parameters));
        }

        let mut names = Vec::with_capacity(3);
        for node in &prop.values[3..] {
            match get_string(node) {
                Some(name) => names.push(name),
                None => {
                    invalid_parameters(compiler, prop);
                    return None;
                }
            }
        }
        if let Some(triplanar) = state.as_any_mut().downcast_mut::<TriplanarTexturing>() {
            triplanar.set_texture_names(&names[0], &names[1], &names[2]);
        }

        engine_debug!("galaxy3d::TriplanarTexturing",
            "Configured from {}:{} ({}, {}, {})", prop.file, prop.line, names[0], names[1], names[2]);

        Some(state)
    }
}

#[cfg(test)]
#[path = "triplanar_texturing_tests.rs"]
mod tests;
