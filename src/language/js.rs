use super::LanguageDefinition;

#[rustfmt::skip]
const TEMPLATES: &[(&str, &str)] = &[
    ("init",            "let {{ name }} = {{ value }};"),
    ("if",              "if ({{ a }} {{ op }} {{ b }}) {"),
    ("else",            "} else {"),
    ("endif",           "}"),
    ("indent",          "    "),
    ("join",            ";"),
    ("type",            "{{ value }}"),
    ("in_brackets",     "[{{ value }}]"),
    ("arr[]",           "let {{ name }} = {{ values }};"),
    ("arr[][]",         "let {{ name }} = {{ values }};"),
    ("arr[][][]",       "let {{ name }} = {{ values }};"),
    ("int",             ""),
    ("double",          ""),

    ("ref",             "{{ name }}"),
    ("global_ref",      "{{ name }}"),
    ("use_global",      ""),
    ("index",           "{{ array }}[{{ i }}]"),
    ("set",             "{{ target }} = {{ value }}"),
    ("return",          "return {{ value }}"),
    ("for",             "for (let {{ i }} = {{ start }}; {{ i }} < {{ end }}; {{ i }}++) {"),
    ("endfor",          "}"),
    ("while",           "while ({{ a }} {{ op }} {{ b }}) {"),
    ("endwhile",        "}"),
    ("zeros[]",         "let {{ name }} = new Array({{ n }}).fill({{ zero }});"),
    ("global_arr[]",    "const {{ name }} = {{ values }};"),
    ("global_arr[][]",  "const {{ name }} = {{ values }};"),
    ("global_arr[][][]", "const {{ name }} = {{ values }};"),
    ("fn_start",        "function {{ name }}({{ param }}) {"),
    ("fn_end",          "}"),
    ("prelude",         "{{ imports }}"),
    ("import_math",     ""),
    ("class_start",     ""),
    ("class_end",       ""),
    ("main",            "if (require.main === module) {\n{{ load }}    const features = process.argv.slice(2 + {{ offset }}).map(Number);\n    {{ print }}\n}"),
    ("print_int",       "console.log({{ method }}(features));"),
    ("print_double",    "console.log({{ method }}(features));"),
    ("result[]",        "let {{ name }} = new Array({{ n }}).fill({{ zero }});"),
    ("array_type",      ""),
    ("print_proba",     "console.log({{ method }}(features).join(' '));"),

    ("exp",             "Math.exp({{ x }})"),
    ("log",             "Math.log({{ x }})"),
    ("sqrt",            "Math.sqrt({{ x }})"),
    ("abs",             "Math.abs({{ x }})"),
    ("tanh",            "Math.tanh({{ x }})"),
    ("pow",             "Math.pow({{ a }}, {{ b }})"),

    ("import_json",     ""),
    ("decl[]",          "let {{ name }};"),
    ("decl[][]",        "let {{ name }};"),
    ("decl[][][]",      "let {{ name }};"),
    ("load_start",      "function loadData(path) {"),
    ("load_field[]",    ""),
    ("load_field[][]",  ""),
    ("load_field[][][]", ""),
    ("load_mid",        "    const data = JSON.parse(require('fs').readFileSync(path, 'utf8'));"),
    ("load_assign",     "    {{ name }} = data['{{ name }}'];"),
    ("load_end",        "}"),
    ("load_call",       "    loadData(process.argv[2]);"),
];

pub(super) fn definition() -> LanguageDefinition {
    LanguageDefinition::new(
        "js",
        "JavaScript",
        "js",
        &["node"],
        None,
        "node {{ src_path }}",
        TEMPLATES,
    )
    .with_int_bits(Some(53))
    .with_reserved(&[
        "await", "break", "case", "catch", "class", "const", "continue", "debugger",
        "default", "delete", "do", "else", "export", "extends", "false", "finally", "for",
        "function", "if", "import", "in", "instanceof", "let", "new", "null", "return",
        "super", "switch", "this", "throw", "true", "try", "typeof", "var", "void", "while",
        "with", "yield",
        "require", "module", "process", "console", "Math", "Number", "Array", "JSON",
    ])
}
