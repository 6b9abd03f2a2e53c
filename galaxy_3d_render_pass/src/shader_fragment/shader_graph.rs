/// In-memory shader program graph that sub-render states extend.
///
/// A `ProgramSet` holds a vertex and a fragment `Program`. Each program has
/// an entry `Function` (inputs, outputs and an ordered list of atoms),
/// uniform parameters, and the shader libraries it depends on. Source
/// generation from this graph happens elsewhere.

use std::sync::Arc;
use glam::Vec3;
use rustc_hash::FxHashMap;

// ===== EXECUTION ORDERS =====

/// Sub-render state execution orders
pub const FFP_TRANSFORM: i32 = 100;
pub const FFP_COLOUR: i32 = 200;
pub const FFP_LIGHTING: i32 = 300;
pub const FFP_TEXTURING: i32 = 400;
pub const FFP_FOG: i32 = 500;

/// Fragment-stage group orders inside an entry function
pub const FFP_PS_COLOUR_BEGIN: i32 = 100;
pub const FFP_PS_TEXTURING: i32 = 200;

// ===== SHADER LIBRARIES =====

pub const FFP_LIB_COMMON: &str = "FFPLib_Common";
pub const FFP_LIB_TEXTURING: &str = "FFPLib_Texturing";

// ===== PARAMETERS =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GpuProgramType {
    Vertex,
    Fragment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GpuConstantType {
    Float3,
    Float4,
    Sampler2D,
}

/// Binding semantic of a function parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterSemantic {
    Position,
    Normal,
    Color,
    TextureCoordinates,
    /// Uniforms
    Unknown,
}

/// What a parameter carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterContent {
    ColorDiffuse,
    NormalObjectSpace,
    NormalViewSpace,
    PositionObjectSpace,
    Unknown,
}

impl ParameterContent {
    /// Semantic and type a non-interpolated parameter of this content gets
    fn default_binding(self) -> (ParameterSemantic, GpuConstantType) {
        match self {
            ParameterContent::ColorDiffuse => (ParameterSemantic::Color, GpuConstantType::Float4),
            ParameterContent::NormalObjectSpace
            | ParameterContent::NormalViewSpace => (ParameterSemantic::Normal, GpuConstantType::Float3),
            ParameterContent::PositionObjectSpace => (ParameterSemantic::Position, GpuConstantType::Float4),
            ParameterContent::Unknown => (ParameterSemantic::Unknown, GpuConstantType::Float4),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub semantic: ParameterSemantic,
    /// Semantic index (texcoord slot, sampler register)
    pub index: u32,
    pub content: ParameterContent,
    pub ty: GpuConstantType,
}

/// Parameters are shared between the function that owns them and the
/// atoms and sub-render states referring to them
pub type ParameterRef = Arc<Parameter>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandDirection {
    In,
    Out,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Operand {
    pub parameter: ParameterRef,
    pub direction: OperandDirection,
}

impl Operand {
    pub fn input(parameter: &ParameterRef) -> Self {
        Self { parameter: parameter.clone(), direction: OperandDirection::In }
    }

    pub fn output(parameter: &ParameterRef) -> Self {
        Self { parameter: parameter.clone(), direction: OperandDirection::Out }
    }
}

// ===== FUNCTIONS =====

#[derive(Debug, Clone, PartialEq)]
pub enum AtomKind {
    /// `destination = source`
    Assign { source: ParameterRef, destination: ParameterRef },
    /// Call into a shader library function
    Invoke { function: String, operands: Vec<Operand> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionAtom {
    pub group_order: i32,
    pub kind: AtomKind,
}

#[derive(Debug, Default)]
pub struct Function {
    inputs: Vec<ParameterRef>,
    outputs: Vec<ParameterRef>,
    atoms: Vec<FunctionAtom>,
}

fn next_free_index(parameters: &[ParameterRef], semantic: ParameterSemantic) -> u32 {
    parameters
        .iter()
        .filter(|p| p.semantic == semantic)
        .map(|p| p.index + 1)
        .max()
        .unwrap_or(0)
}

fn find_or_insert(
    parameters: &mut Vec<ParameterRef>,
    prefix: &str,
    semantic: ParameterSemantic,
    index: Option<u32>,
    content: ParameterContent,
    ty: GpuConstantType,
) -> ParameterRef {
    let existing = parameters.iter().find(|p| {
        p.semantic == semantic
            && match index {
                Some(index) => p.index == index,
                None => p.content == content,
            }
    });
    if let Some(parameter) = existing {
        return parameter.clone();
    }

    let index = index.unwrap_or_else(|| next_free_index(parameters, semantic));
    let parameter = Arc::new(Parameter {
        name: format!("{}{:?}_{}", prefix, semantic, index),
        semantic,
        index,
        content,
        ty,
    });
    parameters.push(parameter.clone());
    parameter
}

impl Function {
    pub fn new() -> Self {
        Self::default()
    }

    /// Input parameter carrying `content`, created on first request
    pub fn resolve_input_parameter(&mut self, content: ParameterContent) -> ParameterRef {
        let (semantic, ty) = content.default_binding();
        find_or_insert(&mut self.inputs, "i", semantic, None, content, ty)
    }

    pub fn resolve_output_parameter(&mut self, content: ParameterContent) -> ParameterRef {
        let (semantic, ty) = content.default_binding();
        find_or_insert(&mut self.outputs, "o", semantic, None, content, ty)
    }

    /// Interpolated input at texcoord `index`
    pub fn resolve_input_texcoord(
        &mut self,
        index: u32,
        content: ParameterContent,
        ty: GpuConstantType,
    ) -> ParameterRef {
        find_or_insert(
            &mut self.inputs, "i", ParameterSemantic::TextureCoordinates, Some(index), content, ty)
    }

    /// Interpolated output carrying `content`, at the next free texcoord
    pub fn resolve_output_texcoord(
        &mut self,
        content: ParameterContent,
        ty: GpuConstantType,
    ) -> ParameterRef {
        find_or_insert(
            &mut self.outputs, "o", ParameterSemantic::TextureCoordinates, None, content, ty)
    }

    /// Atom builder for group `group_order`
    pub fn stage(&mut self, group_order: i32) -> FunctionStage<'_> {
        FunctionStage { function: self, group_order }
    }

    pub fn inputs(&self) -> &[ParameterRef] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[ParameterRef] {
        &self.outputs
    }

    /// Atoms, stable-sorted by group order
    pub fn atoms(&self) -> Vec<&FunctionAtom> {
        let mut atoms: Vec<&FunctionAtom> = self.atoms.iter().collect();
        atoms.sort_by_key(|a| a.group_order);
        atoms
    }
}

/// Appends atoms to one group of a function
pub struct FunctionStage<'a> {
    function: &'a mut Function,
    group_order: i32,
}

impl FunctionStage<'_> {
    pub fn assign(&mut self, source: &ParameterRef, destination: &ParameterRef) -> &mut Self {
        self.function.atoms.push(FunctionAtom {
            group_order: self.group_order,
            kind: AtomKind::Assign {
                source: source.clone(),
                destination: destination.clone(),
            },
        });
        self
    }

    pub fn call_function(&mut self, function: &str, operands: Vec<Operand>) -> &mut Self {
        self.function.atoms.push(FunctionAtom {
            group_order: self.group_order,
            kind: AtomKind::Invoke { function: function.to_string(), operands },
        });
        self
    }
}

// ===== PROGRAMS =====

#[derive(Debug)]
pub struct Program {
    ty: GpuProgramType,
    main: Function,
    uniforms: Vec<ParameterRef>,
    dependencies: Vec<String>,
    float3_values: FxHashMap<String, Vec3>,
}

impl Program {
    pub fn new(ty: GpuProgramType) -> Self {
        Self {
            ty,
            main: Function::new(),
            uniforms: Vec::new(),
            dependencies: Vec::new(),
            float3_values: FxHashMap::default(),
        }
    }

    pub fn program_type(&self) -> GpuProgramType {
        self.ty
    }

    pub fn entry_point(&self) -> &Function {
        &self.main
    }

    pub fn entry_point_mut(&mut self) -> &mut Function {
        &mut self.main
    }

    /// Uniform named `name`, created on first request
    ///
    /// `index` is the sampler register for samplers. Returns `None` if a
    /// uniform with that name already exists with another type.
    pub fn resolve_parameter(
        &mut self,
        ty: GpuConstantType,
        index: Option<u32>,
        name: &str,
    ) -> Option<ParameterRef> {
        if let Some(existing) = self.uniforms.iter().find(|u| u.name == name) {
            return (existing.ty == ty).then(|| existing.clone());
        }

        let parameter = Arc::new(Parameter {
            name: name.to_string(),
            semantic: ParameterSemantic::Unknown,
            index: index.unwrap_or(0),
            content: ParameterContent::Unknown,
            ty,
        });
        self.uniforms.push(parameter.clone());
        Some(parameter)
    }

    pub fn uniform(&self, name: &str) -> Option<&ParameterRef> {
        self.uniforms.iter().find(|u| u.name == name)
    }

    pub fn uniforms(&self) -> &[ParameterRef] {
        &self.uniforms
    }

    /// Add a shader library dependency (once)
    pub fn add_dependency(&mut self, library: &str) {
        if !self.dependencies.iter().any(|d| d == library) {
            self.dependencies.push(library.to_string());
        }
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn set_float3(&mut self, parameter: &ParameterRef, value: Vec3) {
        self.float3_values.insert(parameter.name.clone(), value);
    }

    pub fn float3(&self, name: &str) -> Option<Vec3> {
        self.float3_values.get(name).copied()
    }
}

/// Vertex + fragment program pair
#[derive(Debug)]
pub struct ProgramSet {
    vertex: Program,
    fragment: Program,
}

impl ProgramSet {
    pub fn new() -> Self {
        Self {
            vertex: Program::new(GpuProgramType::Vertex),
            fragment: Program::new(GpuProgramType::Fragment),
        }
    }

    pub fn program(&self, ty: GpuProgramType) -> &Program {
        match ty {
            GpuProgramType::Vertex => &self.vertex,
            GpuProgramType::Fragment => &self.fragment,
        }
    }

    pub fn program_mut(&mut self, ty: GpuProgramType) -> &mut Program {
        match ty {
            GpuProgramType::Vertex => &mut self.vertex,
            GpuProgramType::Fragment => &mut self.fragment,
        }
    }
}

impl Default for ProgramSet {
    fn default() -> Self {
        Self::new()
    }
}

// ===== MATERIAL PASS =====

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextureUnitState {
    pub texture_name: String,
}

/// The material pass a sub-render state adds texture units to
#[derive(Debug, Clone, Default)]
pub struct MaterialPass {
    texture_units: Vec<TextureUnitState>,
}

impl MaterialPass {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_texture_unit_state(&mut self) -> &mut TextureUnitState {
        self.texture_units.push(TextureUnitState::default());
        let last = self.texture_units.len() - 1;
        &mut self.texture_units[last]
    }

    pub fn num_texture_unit_states(&self) -> usize {
        self.texture_units.len()
    }

    pub fn texture_unit_states(&self) -> &[TextureUnitState] {
        &self.texture_units
    }
}

#[cfg(test)]
#[path = "shader_graph_tests.rs"]
mod tests;
