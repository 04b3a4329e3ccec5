use crate::gpu::{PARAMS_LAYOUT, PARAMS_SIZE};
use menger_render::ShaderParams;
use naga::front::wgsl;
use naga::valid::{Capabilities, ValidationFlags, Validator};
use std::path::{Path, PathBuf};

/// Entry point the vertex stage must export.
pub const VERTEX_ENTRY: &str = "vs_main";
/// Entry point the fragment stage must export.
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Why a shader program could not be built.
#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("couldn't open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to compile {path}:\n{diagnostic}")]
    Compile { path: PathBuf, diagnostic: String },
    #[error("failed to link shader program: {0}")]
    Link(#[from] LinkError),
}

/// Interface mismatches between the two stages and the host.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("{path} has no {stage} entry point `{entry}`")]
    MissingEntryPoint {
        path: PathBuf,
        stage: &'static str,
        entry: &'static str,
    },
    #[error("{path} declares no uniform block at @group(0) @binding(0)")]
    MissingUniformBlock { path: PathBuf },
    #[error("uniform block in {path} has no member `{name}`")]
    MissingUniform { path: PathBuf, name: &'static str },
    #[error("uniform `{name}` in {path} is {found}, expected {expected}")]
    UniformLayout {
        path: PathBuf,
        name: &'static str,
        expected: String,
        found: String,
    },
    #[error("uniform block in {path} spans {found} bytes, at most {expected} are uploaded")]
    UniformBlockSize {
        path: PathBuf,
        expected: u32,
        found: u32,
    },
    #[error("pipeline validation failed: {0}")]
    Pipeline(String),
}

/// WGSL source of one stage that has passed parsing and validation.
#[derive(Debug, Clone)]
pub struct StageSource {
    pub path: PathBuf,
    pub source: String,
}

/// A vertex + fragment pair checked to fit together and to accept the
/// viewer's shader parameters.
#[derive(Debug, Clone)]
pub struct ShaderProgram {
    pub vertex: StageSource,
    pub fragment: StageSource,
}

impl ShaderProgram {
    /// Read both stages from disk and check them.
    pub fn load(vertex: &Path, fragment: &Path) -> Result<Self, ShaderError> {
        let vertex_source = read_source(vertex)?;
        let fragment_source = read_source(fragment)?;
        Self::from_sources(vertex, vertex_source, fragment, fragment_source)
    }

    /// Check two in-memory stages. `*_path` only labels diagnostics.
    pub fn from_sources(
        vertex_path: impl Into<PathBuf>,
        vertex_source: String,
        fragment_path: impl Into<PathBuf>,
        fragment_source: String,
    ) -> Result<Self, ShaderError> {
        let vertex = StageSource {
            path: vertex_path.into(),
            source: vertex_source,
        };
        let fragment = StageSource {
            path: fragment_path.into(),
            source: fragment_source,
        };

        let vertex_module = compile(&vertex)?;
        let fragment_module = compile(&fragment)?;

        require_entry_point(
            &vertex_module,
            naga::ShaderStage::Vertex,
            VERTEX_ENTRY,
            "vertex",
            &vertex.path,
        )?;
        require_entry_point(
            &fragment_module,
            naga::ShaderStage::Fragment,
            FRAGMENT_ENTRY,
            "fragment",
            &fragment.path,
        )?;
        require_uniforms(&fragment_module, &fragment.path)?;

        tracing::debug!(
            vertex = %vertex.path.display(),
            fragment = %fragment.path.display(),
            "shader program validated"
        );
        Ok(Self { vertex, fragment })
    }
}

fn read_source(path: &Path) -> Result<String, ShaderError> {
    std::fs::read_to_string(path).map_err(|source| ShaderError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn compile(stage: &StageSource) -> Result<naga::Module, ShaderError> {
    let module = wgsl::parse_str(&stage.source).map_err(|e| ShaderError::Compile {
        path: stage.path.clone(),
        diagnostic: e.emit_to_string(&stage.source),
    })?;
    Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .map_err(|e| ShaderError::Compile {
            path: stage.path.clone(),
            diagnostic: e.emit_to_string(&stage.source),
        })?;
    Ok(module)
}

fn require_entry_point(
    module: &naga::Module,
    stage: naga::ShaderStage,
    entry: &'static str,
    stage_name: &'static str,
    path: &Path,
) -> Result<(), LinkError> {
    let found = module
        .entry_points
        .iter()
        .any(|ep| ep.stage == stage && ep.name == entry);
    if found {
        Ok(())
    } else {
        Err(LinkError::MissingEntryPoint {
            path: path.to_path_buf(),
            stage: stage_name,
            entry,
        })
    }
}

/// The fragment stage must read every `ShaderParams` member from the
/// uniform block at group 0, binding 0.
fn require_uniforms(module: &naga::Module, path: &Path) -> Result<(), LinkError> {
    let ty = module
        .global_variables
        .iter()
        .find_map(|(_, var)| {
            let bound_at_origin = var
                .binding
                .as_ref()
                .is_some_and(|b| b.group == 0 && b.binding == 0);
            (var.space == naga::AddressSpace::Uniform && bound_at_origin).then_some(var.ty)
        })
        .ok_or_else(|| LinkError::MissingUniformBlock {
            path: path.to_path_buf(),
        })?;

    let (members, span) = match &module.types[ty].inner {
        naga::TypeInner::Struct { members, span } => (members.as_slice(), *span),
        _ => (&[][..], 0),
    };
    for name in ShaderParams::UNIFORM_NAMES {
        if !members.iter().any(|m| m.name.as_deref() == Some(name)) {
            return Err(LinkError::MissingUniform {
                path: path.to_path_buf(),
                name,
            });
        }
    }

    // The host uploads one fixed block, so every member must sit where the
    // upload puts it.
    for (name, offset, inner) in &PARAMS_LAYOUT {
        let Some(member) = members.iter().find(|m| m.name.as_deref() == Some(*name)) else {
            continue;
        };
        let found = &module.types[member.ty].inner;
        if member.offset != *offset || found != inner {
            return Err(LinkError::UniformLayout {
                path: path.to_path_buf(),
                name: *name,
                expected: describe_member(inner, *offset),
                found: describe_member(found, member.offset),
            });
        }
    }
    if span > PARAMS_SIZE {
        return Err(LinkError::UniformBlockSize {
            path: path.to_path_buf(),
            expected: PARAMS_SIZE,
            found: span,
        });
    }
    Ok(())
}

fn describe_member(inner: &naga::TypeInner, offset: u32) -> String {
    let ty = match inner {
        naga::TypeInner::Scalar(scalar) if *scalar == naga::Scalar::F32 => "f32".to_string(),
        naga::TypeInner::Vector { size, scalar } if *scalar == naga::Scalar::F32 => {
            format!("vec{}<f32>", *size as u8)
        }
        other => format!("{other:?}"),
    };
    format!("{ty} at offset {offset}")
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERTEX: &str = include_str!("../../../shaders/vertex.wgsl");
    const MENGER: &str = include_str!("../../../shaders/menger.wgsl");

    fn program(vertex: &str, fragment: &str) -> Result<ShaderProgram, ShaderError> {
        ShaderProgram::from_sources("vertex.wgsl", vertex.into(), "frag.wgsl", fragment.into())
    }

    #[test]
    fn bundled_shaders_validate() {
        let program = program(VERTEX, MENGER).unwrap();
        assert_eq!(program.fragment.path, PathBuf::from("frag.wgsl"));
        assert!(program.fragment.source.contains(FRAGMENT_ENTRY));
    }

    #[test]
    fn load_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        let vs = dir.path().join("vertex.wgsl");
        let fs = dir.path().join("menger.wgsl");
        std::fs::write(&vs, VERTEX).unwrap();
        std::fs::write(&fs, MENGER).unwrap();
        let program = ShaderProgram::load(&vs, &fs).unwrap();
        assert_eq!(program.vertex.path, vs);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let vs = dir.path().join("vertex.wgsl");
        std::fs::write(&vs, VERTEX).unwrap();
        let err = ShaderProgram::load(&vs, &dir.path().join("menger.wgsl")).unwrap_err();
        match err {
            ShaderError::Io { path, .. } => assert!(path.ends_with("menger.wgsl")),
            other => panic!("expected io error, got {other}"),
        }
    }

    #[test]
    fn syntax_error_is_compile_error() {
        let err = program(VERTEX, "fn fs_main( -> {").unwrap_err();
        match err {
            ShaderError::Compile { path, diagnostic } => {
                assert_eq!(path, PathBuf::from("frag.wgsl"));
                assert!(!diagnostic.is_empty());
            }
            other => panic!("expected compile error, got {other}"),
        }
    }

    #[test]
    fn type_error_is_compile_error() {
        let bad = MENGER.replace("let focal = 1.0 /", "let focal = true /");
        assert!(matches!(
            program(VERTEX, &bad),
            Err(ShaderError::Compile { .. })
        ));
    }

    #[test]
    fn missing_vertex_entry_is_link_error() {
        let renamed = VERTEX.replace("vs_main", "vertex_main");
        let err = program(&renamed, MENGER).unwrap_err();
        assert!(matches!(
            err,
            ShaderError::Link(LinkError::MissingEntryPoint {
                stage: "vertex",
                entry: "vs_main",
                ..
            })
        ));
    }

    #[test]
    fn missing_fragment_entry_is_link_error() {
        let renamed = MENGER.replace("fs_main", "main_image");
        let err = program(VERTEX, &renamed).unwrap_err();
        assert!(matches!(
            err,
            ShaderError::Link(LinkError::MissingEntryPoint {
                stage: "fragment",
                ..
            })
        ));
    }

    #[test]
    fn missing_uniform_block_is_link_error() {
        let fragment = r#"
@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0);
}
"#;
        let err = program(VERTEX, fragment).unwrap_err();
        assert!(matches!(
            err,
            ShaderError::Link(LinkError::MissingUniformBlock { .. })
        ));
    }

    #[test]
    fn missing_uniform_member_is_link_error() {
        let fragment = r#"
struct Params {
    direction: vec3<f32>,
    time: f32,
};

@group(0) @binding(0)
var<uniform> params: Params;

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(params.direction, params.time);
}
"#;
        let err = program(VERTEX, fragment).unwrap_err();
        match err {
            ShaderError::Link(LinkError::MissingUniform { name, .. }) => {
                assert_eq!(name, "resolution");
            }
            other => panic!("expected missing uniform, got {other}"),
        }
    }

    #[test]
    fn reordered_uniform_block_is_link_error() {
        let fragment = r#"
struct Params {
    resolution: vec2<f32>,
    time: f32,
    current_fov: f32,
    position: vec3<f32>,
    direction: vec3<f32>,
    up: vec3<f32>,
    right: vec3<f32>,
};

@group(0) @binding(0)
var<uniform> params: Params;

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(params.direction, params.time);
}
"#;
        let err = program(VERTEX, fragment).unwrap_err();
        match err {
            ShaderError::Link(LinkError::UniformLayout {
                name,
                expected,
                found,
                ..
            }) => {
                assert_eq!(name, "direction");
                assert_eq!(expected, "vec3<f32> at offset 0");
                assert_eq!(found, "vec3<f32> at offset 32");
            }
            other => panic!("expected layout error, got {other}"),
        }
    }

    #[test]
    fn mistyped_uniform_member_is_link_error() {
        let fragment = r#"
struct Params {
    direction: vec3<f32>,
    time: i32,
    up: vec3<f32>,
    current_fov: f32,
    right: vec3<f32>,
    position: vec3<f32>,
    resolution: vec2<f32>,
};

@group(0) @binding(0)
var<uniform> params: Params;

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(params.direction, 1.0);
}
"#;
        let err = program(VERTEX, fragment).unwrap_err();
        assert!(matches!(
            err,
            ShaderError::Link(LinkError::UniformLayout { name: "time", .. })
        ));
    }

    #[test]
    fn oversized_uniform_block_is_link_error() {
        let grown = MENGER.replace("_pad2: vec2<f32>,", "_pad2: vec2<f32>,\n    extra: vec4<f32>,");
        let err = program(VERTEX, &grown).unwrap_err();
        assert!(matches!(
            err,
            ShaderError::Link(LinkError::UniformBlockSize {
                expected: 80,
                found: 96,
                ..
            })
        ));
    }
}
