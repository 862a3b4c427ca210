use estimator_port::language::registry;

pub fn cmd_languages() {
    for lang in registry().iter() {
        let external = if lang.supports_external_data() {
            "embedded, split, externalized"
        } else {
            "embedded, split"
        };
        println!("{:<6} {} (.{})", lang.key, lang.label, lang.suffix);
        if let Some(compile) = &lang.compile_command {
            println!("       compile: {}", compile);
        }
        println!("       execute: {}", lang.execute_command);
        println!("       modes:   {}", external);
        if !lang.dependencies.is_empty() {
            println!("       needs:   {}", lang.dependencies.join(", "));
        }
    }
}
