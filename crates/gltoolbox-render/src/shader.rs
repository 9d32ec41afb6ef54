//! Shader management.
//!
//! A [`Shader`] is one stage's source text, loaded from disk with `{0}`,
//! `{1}`, … placeholders filled in. A [`ShaderProgram`] pairs a vertex and a
//! fragment shader and links them through the backend.

use std::fmt;
use std::path::{Path, PathBuf};

use glam::Mat4;

use crate::backend::{ProgramId, RenderBackend, ShaderId, ShaderStage, UniformValue};
use crate::error::{RenderError, RenderResult};

/// Source of a single shader stage.
#[derive(Debug, Clone)]
pub struct Shader {
    stage: ShaderStage,
    path: Option<PathBuf>,
    source: String,
    compiled: Option<ShaderId>,
}

impl Shader {
    /// Reads a shader file, replacing `{n}` with the `n`-th format argument.
    ///
    /// Placeholders without a matching argument are left untouched.
    pub fn load(
        path: impl AsRef<Path>,
        stage: ShaderStage,
        format_args: &[&dyn fmt::Display],
    ) -> RenderResult<Self> {
        let path = path.as_ref();
        let mut source = std::fs::read_to_string(path).map_err(|source| RenderError::ShaderLoad {
            path: path.to_path_buf(),
            source,
        })?;
        for (index, arg) in format_args.iter().enumerate() {
            source = source.replace(&format!("{{{index}}}"), &arg.to_string());
        }
        log::info!("loaded {stage} shader '{}'", path.display());
        Ok(Self {
            stage,
            path: Some(path.to_path_buf()),
            source,
            compiled: None,
        })
    }

    /// Wraps in-memory source text.
    pub fn from_source(stage: ShaderStage, source: impl Into<String>) -> Self {
        Self {
            stage,
            path: None,
            source: source.into(),
            compiled: None,
        }
    }

    /// Compiles the source through the backend.
    pub fn compile(&mut self, backend: &mut dyn RenderBackend) -> RenderResult<ShaderId> {
        if self.compiled.is_some() {
            return Err(RenderError::ShaderAlreadyCompiled(self.label()));
        }
        let id = backend.compile_shader(self.stage, &self.source)?;
        log::debug!("compiled {} shader '{}'", self.stage, self.label());
        self.compiled = Some(id);
        Ok(id)
    }

    /// Returns the compiled handle.
    pub fn compiled(&self) -> RenderResult<ShaderId> {
        self.compiled
            .ok_or_else(|| RenderError::ShaderNotCompiled(self.label()))
    }

    #[must_use]
    pub fn is_compiled(&self) -> bool {
        self.compiled.is_some()
    }

    #[must_use]
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    fn label(&self) -> String {
        self.path.as_ref().map_or_else(
            || format!("<inline {}>", self.stage),
            |path| path.display().to_string(),
        )
    }
}

impl fmt::Display for Shader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.is_compiled() {
            "compiled"
        } else {
            "not compiled"
        };
        writeln!(f, "File: {}", self.label())?;
        writeln!(f, "Type: {}", self.stage.to_string().to_uppercase())?;
        write!(f, "Status: {status}")
    }
}

/// A linked vertex + fragment program.
#[derive(Debug, Clone)]
pub struct ShaderProgram {
    name: String,
    vertex: Shader,
    fragment: Shader,
    program: Option<ProgramId>,
    enabled: bool,
}

impl ShaderProgram {
    /// Pairs two shaders, checking that each sits in the right slot.
    pub fn new(vertex: Shader, fragment: Shader) -> RenderResult<Self> {
        for (shader, expected) in [(&vertex, ShaderStage::Vertex), (&fragment, ShaderStage::Fragment)] {
            if shader.stage() != expected {
                return Err(RenderError::ShaderStageMismatch {
                    expected,
                    actual: shader.stage(),
                });
            }
        }
        Ok(Self {
            name: "unnamed".to_string(),
            vertex,
            fragment,
            program: None,
            enabled: true,
        })
    }

    /// Sets the program name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    #[must_use]
    pub fn vertex(&self) -> &Shader {
        &self.vertex
    }

    #[must_use]
    pub fn fragment(&self) -> &Shader {
        &self.fragment
    }

    /// Compiles any pending shader and links the program.
    pub fn compile(&mut self, backend: &mut dyn RenderBackend) -> RenderResult<ProgramId> {
        if self.program.is_some() {
            return Err(RenderError::ShaderAlreadyCompiled(self.name.clone()));
        }
        for shader in [&mut self.vertex, &mut self.fragment] {
            if !shader.is_compiled() {
                shader.compile(backend)?;
            }
        }
        let program = backend.link_program(self.vertex.compiled()?, self.fragment.compiled()?)?;
        log::debug!("linked shader program '{}'", self.name);
        self.program = Some(program);
        Ok(program)
    }

    #[must_use]
    pub fn is_compiled(&self) -> bool {
        self.program.is_some()
    }

    /// Returns the linked program handle.
    pub fn program(&self) -> RenderResult<ProgramId> {
        self.program
            .ok_or_else(|| RenderError::ShaderNotCompiled(self.name.clone()))
    }

    /// Makes this the active program. Does nothing while disabled.
    pub fn start(&self, backend: &mut dyn RenderBackend) -> RenderResult<()> {
        let program = self.program()?;
        if self.enabled {
            backend.use_program(Some(program));
        }
        Ok(())
    }

    /// Returns to the fixed-function pipeline.
    pub fn stop(&self, backend: &mut dyn RenderBackend) -> RenderResult<()> {
        self.program()?;
        backend.use_program(None);
        Ok(())
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Sets a `float`/`vecN` uniform from 1 to 4 values.
    pub fn uniform_f(
        &self,
        backend: &mut dyn RenderBackend,
        name: &str,
        values: &[f32],
    ) -> RenderResult<()> {
        self.set_uniform(backend, name, values.len(), || {
            UniformValue::Float(values.to_vec())
        })
    }

    /// Sets an `int`/`ivecN` uniform from 1 to 4 values.
    pub fn uniform_i(
        &self,
        backend: &mut dyn RenderBackend,
        name: &str,
        values: &[i32],
    ) -> RenderResult<()> {
        self.set_uniform(backend, name, values.len(), || UniformValue::Int(values.to_vec()))
    }

    /// Sets a `mat4` uniform.
    pub fn uniform_matrix(
        &self,
        backend: &mut dyn RenderBackend,
        name: &str,
        matrix: Mat4,
    ) -> RenderResult<()> {
        self.set_uniform(backend, name, 1, || UniformValue::Matrix(matrix))
    }

    fn set_uniform(
        &self,
        backend: &mut dyn RenderBackend,
        name: &str,
        count: usize,
        value: impl FnOnce() -> UniformValue,
    ) -> RenderResult<()> {
        if !self.enabled {
            return Ok(());
        }
        if !(1..=4).contains(&count) {
            return Err(RenderError::InvalidUniform(format!(
                "'{name}' takes 1 to 4 values, got {count}"
            )));
        }
        backend.set_uniform(self.program()?, name, value());
        Ok(())
    }
}

impl fmt::Display for ShaderProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let compiled = if self.is_compiled() {
            "compiled"
        } else {
            "not compiled"
        };
        let enabled = if self.enabled { "enabled" } else { "disabled" };
        writeln!(f, "shader: {}", self.name)?;
        writeln!(f, "fragment shader: {}", self.fragment.label())?;
        writeln!(f, "vertex shader: {}", self.vertex.label())?;
        write!(f, "status: {compiled} | {enabled}")
    }
}

/// Loads `<name>.vsh` and `<name>.fsh` from `dir` and links them.
///
/// `name` may carry either extension; it is stripped first.
pub fn load_shader(
    dir: impl AsRef<Path>,
    name: &str,
    vertex_args: &[&dyn fmt::Display],
    fragment_args: &[&dyn fmt::Display],
    backend: &mut dyn RenderBackend,
) -> RenderResult<ShaderProgram> {
    let stem = [ShaderStage::Vertex, ShaderStage::Fragment]
        .iter()
        .find_map(|stage| name.strip_suffix(&format!(".{}", stage.extension())))
        .unwrap_or(name);
    let dir = dir.as_ref();
    let file = |stage: ShaderStage| dir.join(format!("{stem}.{}", stage.extension()));

    let vertex = Shader::load(file(ShaderStage::Vertex), ShaderStage::Vertex, vertex_args)?;
    let fragment = Shader::load(file(ShaderStage::Fragment), ShaderStage::Fragment, fragment_args)?;
    let mut program = ShaderProgram::new(vertex, fragment)?.with_name(stem);
    program.compile(backend)?;
    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Command, RecordingBackend};

    fn program() -> ShaderProgram {
        ShaderProgram::new(
            Shader::from_source(ShaderStage::Vertex, "void main() { gl_Position = ftransform(); }"),
            Shader::from_source(ShaderStage::Fragment, "void main() { gl_FragColor = vec4(1.0); }"),
        )
        .unwrap()
        .with_name("flat")
    }

    fn write_pair(dir: &Path, stem: &str) {
        std::fs::create_dir_all(dir).unwrap();
        std::fs::write(dir.join(format!("{stem}.vsh")), "uniform float scale = {0};").unwrap();
        std::fs::write(dir.join(format!("{stem}.fsh")), "vec4 tint = vec4({0}, {1}, 0.0, 1.0);")
            .unwrap();
    }

    #[test]
    fn test_load_substitutes_placeholders() {
        let dir = std::env::temp_dir().join("gltoolbox_shader_test_load");
        write_pair(&dir, "tint");

        let shader = Shader::load(dir.join("tint.fsh"), ShaderStage::Fragment, &[&0.5, &"x"]).unwrap();
        assert_eq!(shader.source(), "vec4 tint = vec4(0.5, x, 0.0, 1.0);");
        assert_eq!(shader.path(), Some(dir.join("tint.fsh").as_path()));

        let untouched = Shader::load(dir.join("tint.fsh"), ShaderStage::Fragment, &[]).unwrap();
        assert!(untouched.source().contains("{0}"));
    }

    #[test]
    fn test_load_missing_file() {
        let result = Shader::load("/nonexistent/a.vsh", ShaderStage::Vertex, &[]);
        assert!(matches!(result, Err(RenderError::ShaderLoad { .. })));
    }

    #[test]
    fn test_shader_compiles_once() {
        let mut backend = RecordingBackend::new();
        let mut shader = Shader::from_source(ShaderStage::Vertex, "void main() {}");
        assert!(matches!(shader.compiled(), Err(RenderError::ShaderNotCompiled(_))));

        shader.compile(&mut backend).unwrap();
        assert!(shader.is_compiled());
        assert!(matches!(
            shader.compile(&mut backend),
            Err(RenderError::ShaderAlreadyCompiled(_))
        ));
    }

    #[test]
    fn test_program_rejects_swapped_stages() {
        let result = ShaderProgram::new(
            Shader::from_source(ShaderStage::Fragment, "f"),
            Shader::from_source(ShaderStage::Vertex, "v"),
        );
        assert!(matches!(
            result,
            Err(RenderError::ShaderStageMismatch {
                expected: ShaderStage::Vertex,
                actual: ShaderStage::Fragment,
            })
        ));
    }

    #[test]
    fn test_program_lifecycle() {
        let mut backend = RecordingBackend::new();
        let mut program = program();
        assert!(program.start(&mut backend).is_err());

        let id = program.compile(&mut backend).unwrap();
        assert!(program.compile(&mut backend).is_err());

        program.start(&mut backend).unwrap();
        assert_eq!(backend.current_program(), Some(id));
        program.stop(&mut backend).unwrap();
        assert_eq!(backend.current_program(), None);

        program.disable();
        program.start(&mut backend).unwrap();
        assert_eq!(backend.current_program(), None);
    }

    #[test]
    fn test_uniforms() {
        let mut backend = RecordingBackend::new();
        let mut program = program();
        let id = program.compile(&mut backend).unwrap();
        backend.take_commands();

        program.uniform_f(&mut backend, "color", &[1.0, 0.5, 0.0]).unwrap();
        program.uniform_i(&mut backend, "mode", &[2]).unwrap();
        program.uniform_matrix(&mut backend, "mvp", Mat4::IDENTITY).unwrap();
        assert_eq!(
            backend.commands()[0],
            Command::SetUniform {
                program: id,
                name: "color".to_string(),
                value: UniformValue::Float(vec![1.0, 0.5, 0.0]),
            }
        );
        assert_eq!(backend.commands().len(), 3);

        assert!(matches!(
            program.uniform_f(&mut backend, "color", &[0.0; 5]),
            Err(RenderError::InvalidUniform(_))
        ));
        assert!(program.uniform_i(&mut backend, "mode", &[]).is_err());

        program.disable();
        program.uniform_f(&mut backend, "color", &[1.0]).unwrap();
        assert_eq!(backend.commands().len(), 3);
    }

    #[test]
    fn test_load_shader_strips_extension() {
        let dir = std::env::temp_dir().join("gltoolbox_shader_test_pair");
        write_pair(&dir, "glow");
        let mut backend = RecordingBackend::new();

        let program = load_shader(&dir, "glow.vsh", &[&2], &[&0.1, &0.2], &mut backend).unwrap();
        assert_eq!(program.name(), "glow");
        assert!(program.is_compiled());
        assert_eq!(program.vertex().source(), "uniform float scale = 2;");
        assert_eq!(program.fragment().source(), "vec4 tint = vec4(0.1, 0.2, 0.0, 1.0);");
    }

    #[test]
    fn test_display() {
        let text = program().to_string();
        assert!(text.starts_with("shader: flat\n"));
        assert!(text.ends_with("status: not compiled | enabled"));
    }
}
