use serde_json::{Map, Value};

use super::{Blob, DataArray, GeneratedArtifact, Method, NumberKind, PackagingMode};
use crate::api::PortOptions;
use crate::bind;
use crate::emit::Emitter;
use crate::error::{PortError, Result};
use crate::generate::Generator;
use crate::language::{LanguageDefinition, LOADER_KEYS, PROBA_KEYS, PROCEDURE_KEYS, REQUIRED_KEYS};
use crate::template::Bindings;

/// Run a generator and lay its output out as one program (plus a data file
/// when externalized). Everything is checked before any text is produced,
/// and nothing is returned unless every step succeeds.
pub(crate) fn assemble<G: Generator + ?Sized>(
    generator: &G,
    lang: &LanguageDefinition,
    mode: PackagingMode,
    options: &PortOptions,
) -> Result<GeneratedArtifact> {
    let family = generator.family();
    lang.require(REQUIRED_KEYS)?;
    lang.require(PROCEDURE_KEYS)?;
    if mode == PackagingMode::Externalized {
        if !lang.supports_external_data() {
            return Err(PortError::UnsupportedMode {
                family: family.to_string(),
                language: lang.key.clone(),
                mode: mode.name().to_string(),
            });
        }
        lang.require(LOADER_KEYS)?;
    }
    let probabilities = match options.method {
        Method::Predict => None,
        Method::PredictProba => {
            let n = generator.probabilities().ok_or_else(|| PortError::UnsupportedMethod {
                family: family.to_string(),
                method: options.method.name().to_string(),
            })?;
            lang.require(PROBA_KEYS)?;
            Some(n)
        }
    };
    options.validate_for(lang)?;
    generator.validate()?;
    log::debug!("generating {} {} for '{}' ({})", family, options.method, lang.key, mode);

    let class_name = options.class_name.as_str();
    let method = options.method_name.as_str();
    let arrays = generator.arrays(mode, options.method);

    let mut out = Emitter::new(lang, mode, options.precision);
    let class_start = out.render("class_start", &bind!("class_name" => class_name))?;
    let nested = !class_start.is_empty();

    // The body goes first so the prelude knows whether math is used.
    let mut body = Emitter::new(lang, mode, options.precision)
        .with_method(options.method)
        .at_depth(usize::from(nested) + 1);
    for array in &arrays {
        match mode {
            PackagingMode::Embedded => body.declare("arr", array)?,
            PackagingMode::Split | PackagingMode::Externalized => {
                body.stmt("use_global", &bind!("name" => array.name.as_str()))?
            }
        }
    }
    generator.emit_body(&mut body)?;
    let uses_math = body.uses_math();
    log::debug!("{} body lines, math {}", body.lines().len(), uses_math);

    let mut imports = String::new();
    if uses_math {
        imports.push_str(&out.render("import_math", &Bindings::new())?);
    }
    if mode == PackagingMode::Externalized {
        imports.push_str(&out.render("import_json", &Bindings::new())?);
    }
    out.stmt("prelude", &bind!("imports" => imports))?;
    out.blank();
    if nested {
        out.open("class_start", &bind!("class_name" => class_name))?;
    }

    match mode {
        PackagingMode::Embedded => {}
        PackagingMode::Split => {
            for array in &arrays {
                out.declare("global_arr", array)?;
            }
            out.blank();
        }
        PackagingMode::Externalized => {
            for array in &arrays {
                out.declare("decl", array)?;
            }
            out.blank();
            loader(&mut out, &arrays)?;
            out.blank();
        }
    }

    let output = generator.output();
    let return_type = match probabilities {
        Some(_) => {
            let element = out.type_name(NumberKind::Double)?;
            out.render("array_type", &bind!("value" => element))?
        }
        None => out.type_name(output)?,
    };
    out.open(
        "fn_start",
        &bind!("name" => method, "type" => return_type, "param" => "features"),
    )?;
    out.extend(body.into_lines());
    out.close("fn_end")?;
    out.blank();

    let print = match (probabilities, output) {
        (Some(n), _) => out.render("print_proba", &bind!("method" => method, "n" => n.to_string()))?,
        (None, NumberKind::Int) => out.render("print_int", &bind!("method" => method))?,
        (None, NumberKind::Double) => out.render("print_double", &bind!("method" => method))?,
    };
    let (offset, load) = match mode {
        PackagingMode::Externalized => {
            let call = out.render("load_call", &Bindings::new())?;
            ("1", format!("{}\n", call))
        }
        PackagingMode::Embedded | PackagingMode::Split => ("0", String::new()),
    };
    let main = out.render(
        "main",
        &bind!(
            "method" => method,
            "class_name" => class_name,
            "offset" => offset,
            "load" => load,
            "print" => print,
        ),
    )?;
    out.raw(&main);
    if nested {
        out.close("class_end")?;
    }

    let mut contents = out.into_lines().join("\n");
    contents.push('\n');

    let stem = if lang.stem_is_class {
        class_name.to_string()
    } else {
        class_name.to_lowercase()
    };
    let data = match mode {
        PackagingMode::Externalized => vec![Blob {
            filename: format!("{}.json", stem),
            contents: data_file(&arrays)?,
        }],
        PackagingMode::Embedded | PackagingMode::Split => Vec::new(),
    };
    let artifact = GeneratedArtifact {
        language: lang.key.clone(),
        family,
        mode,
        method: options.method,
        suffix: lang.suffix.clone(),
        class_name: class_name.to_string(),
        logic: Blob {
            filename: format!("{}.{}", stem, lang.suffix),
            contents,
        },
        stem,
        data,
        compile_pattern: lang.compile_command.clone(),
        execute_pattern: lang.execute_command.clone(),
    };
    log::info!(
        "generated {} ({} {}, {} data file(s))",
        artifact.logic.filename,
        family,
        mode,
        artifact.data.len()
    );
    Ok(artifact)
}

/// Startup routine that reads the data file into the declared globals.
fn loader(out: &mut Emitter<'_>, arrays: &[DataArray]) -> Result<()> {
    out.stmt("load_start", &Bindings::new())?;
    for (index, array) in arrays.iter().enumerate() {
        let key = format!("load_field{}", "[]".repeat(array.rank()));
        let ty = out.type_name(array.kind())?;
        out.stmt(
            &key,
            &bind!("name" => array.name.as_str(), "index" => index.to_string(), "type" => ty),
        )?;
    }
    out.stmt("load_mid", &Bindings::new())?;
    for (index, array) in arrays.iter().enumerate() {
        out.stmt(
            "load_assign",
            &bind!("name" => array.name.as_str(), "index" => index.to_string()),
        )?;
    }
    out.stmt("load_end", &Bindings::new())
}

/// One flat JSON object of named arrays. Values are written at full
/// precision regardless of the literal precision option.
fn data_file(arrays: &[DataArray]) -> Result<String> {
    let mut map = Map::new();
    for array in arrays {
        map.insert(array.name.clone(), array.to_json());
    }
    serde_json::to_string(&Value::Object(map)).map_err(|e| PortError::malformed("data", e.to_string()))
}
