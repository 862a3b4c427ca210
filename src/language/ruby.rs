use super::LanguageDefinition;

#[rustfmt::skip]
const TEMPLATES: &[(&str, &str)] = &[
    ("init",            "{{ name }} = {{ value }}"),
    ("if",              "if {{ a }} {{ op }} {{ b }}"),
    ("else",            "else"),
    ("endif",           "end"),
    ("indent",          "  "),
    ("join",            ""),
    ("type",            "{{ value }}"),
    ("in_brackets",     "[{{ value }}]"),
    ("arr[]",           "{{ name }} = {{ values }}"),
    ("arr[][]",         "{{ name }} = {{ values }}"),
    ("arr[][][]",       "{{ name }} = {{ values }}"),
    ("int",             ""),
    ("double",          ""),

    ("ref",             "{{ name }}"),
    ("global_ref",      "${{ name }}"),
    ("use_global",      ""),
    ("index",           "{{ array }}[{{ i }}]"),
    ("set",             "{{ target }} = {{ value }}"),
    ("return",          "return {{ value }}"),
    ("for",             "for {{ i }} in {{ start }}...{{ end }}"),
    ("endfor",          "end"),
    ("while",           "while {{ a }} {{ op }} {{ b }}"),
    ("endwhile",        "end"),
    ("zeros[]",         "{{ name }} = Array.new({{ n }}, {{ zero }})"),
    ("global_arr[]",    "${{ name }} = {{ values }}"),
    ("global_arr[][]",  "${{ name }} = {{ values }}"),
    ("global_arr[][][]", "${{ name }} = {{ values }}"),
    ("fn_start",        "def {{ name }}({{ param }})"),
    ("fn_end",          "end"),
    ("prelude",         "{{ imports }}"),
    ("import_math",     ""),
    ("class_start",     ""),
    ("class_end",       ""),
    ("main",            "if __FILE__ == $0\n{{ load }}  features = ARGV.drop({{ offset }}).map(&:to_f)\n  {{ print }}\nend"),
    ("print_int",       "puts {{ method }}(features)"),
    ("print_double",    "puts {{ method }}(features)"),
    ("result[]",        "{{ name }} = Array.new({{ n }}, {{ zero }})"),
    ("array_type",      ""),
    ("print_proba",     "puts {{ method }}(features).join(' ')"),

    ("exp",             "Math.exp({{ x }})"),
    ("log",             "Math.log({{ x }})"),
    ("sqrt",            "Math.sqrt({{ x }})"),
    ("abs",             "({{ x }}).abs"),
    ("tanh",            "Math.tanh({{ x }})"),
    ("pow",             "(({{ a }}) ** ({{ b }}))"),

    ("import_json",     "require 'json'"),
    ("decl[]",          "${{ name }} = nil"),
    ("decl[][]",        "${{ name }} = nil"),
    ("decl[][][]",      "${{ name }} = nil"),
    ("load_start",      "def load_data(path)"),
    ("load_field[]",    ""),
    ("load_field[][]",  ""),
    ("load_field[][][]", ""),
    ("load_mid",        "  data = JSON.parse(File.read(path))"),
    ("load_assign",     "  ${{ name }} = data['{{ name }}']"),
    ("load_end",        "end"),
    ("load_call",       "  load_data(ARGV[0])"),
];

pub(super) fn definition() -> LanguageDefinition {
    LanguageDefinition::new(
        "ruby",
        "Ruby",
        "rb",
        &["ruby"],
        None,
        "ruby {{ src_path }}",
        TEMPLATES,
    )
    .with_int_bits(None)
    .with_reserved(&[
        "BEGIN", "END", "alias", "and", "begin", "break", "case", "class", "def", "do",
        "else", "elsif", "end", "ensure", "false", "for", "if", "in", "module", "next",
        "nil", "not", "or", "redo", "rescue", "retry", "return", "self", "super", "then",
        "true", "undef", "unless", "until", "when", "while", "yield",
        "puts", "print", "require", "loop", "raise",
    ])
}
