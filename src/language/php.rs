use super::LanguageDefinition;

#[rustfmt::skip]
const TEMPLATES: &[(&str, &str)] = &[
    ("init",            "${{ name }} = {{ value }};"),
    ("if",              "if ({{ a }} {{ op }} {{ b }}) {"),
    ("else",            "} else {"),
    ("endif",           "}"),
    ("indent",          "    "),
    ("join",            ";"),
    ("type",            "{{ value }}"),
    ("in_brackets",     "[{{ value }}]"),
    ("arr[]",           "${{ name }} = {{ values }};"),
    ("arr[][]",         "${{ name }} = {{ values }};"),
    ("arr[][][]",       "${{ name }} = {{ values }};"),
    ("int",             ""),
    ("double",          ""),

    ("ref",             "${{ name }}"),
    ("global_ref",      "${{ name }}"),
    ("use_global",      "global ${{ name }};"),
    ("index",           "{{ array }}[{{ i }}]"),
    ("set",             "{{ target }} = {{ value }}"),
    ("return",          "return {{ value }}"),
    ("for",             "for (${{ i }} = {{ start }}; ${{ i }} < {{ end }}; ${{ i }}++) {"),
    ("endfor",          "}"),
    ("while",           "while ({{ a }} {{ op }} {{ b }}) {"),
    ("endwhile",        "}"),
    ("zeros[]",         "${{ name }} = array_fill(0, {{ n }}, {{ zero }});"),
    ("global_arr[]",    "${{ name }} = {{ values }};"),
    ("global_arr[][]",  "${{ name }} = {{ values }};"),
    ("global_arr[][][]", "${{ name }} = {{ values }};"),
    ("fn_start",        "function {{ name }}(${{ param }}) {"),
    ("fn_end",          "}"),
    ("prelude",         "<?php{{ imports }}"),
    ("import_math",     ""),
    ("class_start",     ""),
    ("class_end",       ""),
    ("main",            "if (isset($argv) && count($argv) > 1) {\n{{ load }}    $features = array_map('floatval', array_slice($argv, 1 + {{ offset }}));\n    {{ print }}\n}"),
    ("print_int",       "echo {{ method }}($features) . \"\\n\";"),
    ("print_double",    "echo json_encode({{ method }}($features)) . \"\\n\";"),
    ("result[]",        "${{ name }} = array_fill(0, {{ n }}, {{ zero }});"),
    ("array_type",      ""),
    ("print_proba",     "echo implode(' ', array_map('json_encode', {{ method }}($features))) . \"\\n\";"),

    ("exp",             "exp({{ x }})"),
    ("log",             "log({{ x }})"),
    ("sqrt",            "sqrt({{ x }})"),
    ("abs",             "abs({{ x }})"),
    ("tanh",            "tanh({{ x }})"),
    ("pow",             "pow({{ a }}, {{ b }})"),

    ("import_json",     ""),
    ("decl[]",          "${{ name }} = null;"),
    ("decl[][]",        "${{ name }} = null;"),
    ("decl[][][]",      "${{ name }} = null;"),
    ("load_start",      "function load_data($path) {"),
    ("load_field[]",    "    global ${{ name }};"),
    ("load_field[][]",  "    global ${{ name }};"),
    ("load_field[][][]", "    global ${{ name }};"),
    ("load_mid",        "    $data = json_decode(file_get_contents($path), true);"),
    ("load_assign",     "    ${{ name }} = $data['{{ name }}'];"),
    ("load_end",        "}"),
    ("load_call",       "    load_data($argv[1]);"),
];

pub(super) fn definition() -> LanguageDefinition {
    LanguageDefinition::new(
        "php",
        "PHP",
        "php",
        &["php"],
        None,
        "php -f {{ src_path }}",
        TEMPLATES,
    )
    .with_reserved(&[
        "abstract", "and", "array", "as", "break", "callable", "case", "catch", "class",
        "clone", "const", "continue", "declare", "default", "do", "echo", "else", "elseif",
        "empty", "enddeclare", "endfor", "endforeach", "endif", "endswitch", "endwhile",
        "eval", "exit", "extends", "final", "fn", "for", "foreach", "function", "global",
        "goto", "if", "implements", "include", "instanceof", "interface", "isset", "list",
        "match", "new", "or", "print", "private", "protected", "public", "require",
        "return", "static", "switch", "throw", "trait", "try", "unset", "use", "var",
        "while", "xor",
        "exp", "log", "sqrt", "abs", "tanh", "pow", "array_fill", "array_map",
        "array_slice", "count", "floatval", "implode", "json_encode", "json_decode",
        "file_get_contents",
    ])
    .with_case_insensitive_names()
}
