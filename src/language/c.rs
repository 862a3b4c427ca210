use super::LanguageDefinition;

#[rustfmt::skip]
const TEMPLATES: &[(&str, &str)] = &[
    ("init",            "{{ type }} {{ name }} = {{ value }};"),
    ("if",              "if ({{ a }} {{ op }} {{ b }}) {"),
    ("else",            "} else {"),
    ("endif",           "}"),
    ("indent",          "    "),
    ("join",            ";"),
    ("type",            "{{ value }}"),
    ("in_brackets",     "{{{ value }}}"),
    ("arr[]",           "{{ type }} {{ name }}[{{ n }}] = {{ values }};"),
    ("arr[][]",         "{{ type }} {{ name }}[{{ n }}][{{ m }}] = {{ values }};"),
    ("arr[][][]",       "{{ type }} {{ name }}[{{ n }}][{{ m }}][{{ k }}] = {{ values }};"),
    ("int",             "int"),
    ("double",          "double"),

    ("ref",             "{{ name }}"),
    ("global_ref",      "{{ name }}"),
    ("use_global",      ""),
    ("index",           "{{ array }}[{{ i }}]"),
    ("set",             "{{ target }} = {{ value }}"),
    ("return",          "return {{ value }}"),
    ("for",             "for (int {{ i }} = {{ start }}; {{ i }} < {{ end }}; {{ i }}++) {"),
    ("endfor",          "}"),
    ("while",           "while ({{ a }} {{ op }} {{ b }}) {"),
    ("endwhile",        "}"),
    ("zeros[]",         "{{ type }} {{ name }}[{{ n }}] = {0};"),
    ("global_arr[]",    "{{ type }} {{ name }}[{{ n }}] = {{ values }};"),
    ("global_arr[][]",  "{{ type }} {{ name }}[{{ n }}][{{ m }}] = {{ values }};"),
    ("global_arr[][][]", "{{ type }} {{ name }}[{{ n }}][{{ m }}][{{ k }}] = {{ values }};"),
    ("fn_start",        "{{ type }} {{ name }}(double {{ param }}[]) {"),
    ("fn_end",          "}"),
    ("prelude",         "#include <stdio.h>\n#include <stdlib.h>{{ imports }}"),
    ("import_math",     "\n#include <math.h>"),
    ("class_start",     ""),
    ("class_end",       ""),
    ("main",            "int main(int argc, const char *argv[]) {\n    double features[argc - 1];\n    for (int i = 1; i < argc; i++) {\n        features[i - 1] = atof(argv[i]);\n    }\n    {{ print }}\n    return 0;\n}"),
    ("print_int",       "printf(\"%d\\n\", {{ method }}(features));"),
    ("print_double",    "printf(\"%.17g\\n\", {{ method }}(features));"),
    ("result[]",        "static {{ type }} {{ name }}[{{ n }}];\nfor (int i = 0; i < {{ n }}; i++) {{ name }}[i] = {{ zero }};"),
    ("array_type",      "{{ value }}*"),
    ("print_proba",     "double *probabilities = {{ method }}(features);\n    for (int i = 0; i < {{ n }}; i++) {\n        printf(i == 0 ? \"%.17g\" : \" %.17g\", probabilities[i]);\n    }\n    printf(\"\\n\");"),

    ("exp",             "exp({{ x }})"),
    ("log",             "log({{ x }})"),
    ("sqrt",            "sqrt({{ x }})"),
    ("abs",             "fabs({{ x }})"),
    ("tanh",            "tanh({{ x }})"),
    ("pow",             "pow({{ a }}, {{ b }})"),
];

pub(super) fn definition() -> LanguageDefinition {
    LanguageDefinition::new(
        "c",
        "C",
        "c",
        &["gcc"],
        Some("gcc {{ src_path }} -std=c99 -lm -o {{ dest_path }}"),
        "{{ dest_path }}",
        TEMPLATES,
    )
    .with_int_bits(Some(32))
    .with_reserved(&[
        "auto", "break", "case", "char", "const", "continue", "default", "do", "double",
        "else", "enum", "extern", "float", "for", "goto", "if", "inline", "int", "long",
        "register", "restrict", "return", "short", "signed", "sizeof", "static", "struct",
        "switch", "typedef", "union", "unsigned", "void", "volatile", "while",
        "printf", "atof", "exp", "log", "sqrt", "fabs", "tanh", "pow",
    ])
}
