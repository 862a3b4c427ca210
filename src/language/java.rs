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
    ("arr[]",           "{{ type }}[] {{ name }} = {{ values }};"),
    ("arr[][]",         "{{ type }}[][] {{ name }} = {{ values }};"),
    ("arr[][][]",       "{{ type }}[][][] {{ name }} = {{ values }};"),
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
    ("zeros[]",         "{{ type }}[] {{ name }} = new {{ type }}[{{ n }}];"),
    ("global_arr[]",    "private static final {{ type }}[] {{ name }} = {{ values }};"),
    ("global_arr[][]",  "private static final {{ type }}[][] {{ name }} = {{ values }};"),
    ("global_arr[][][]", "private static final {{ type }}[][][] {{ name }} = {{ values }};"),
    ("fn_start",        "public static {{ type }} {{ name }}(double[] {{ param }}) {"),
    ("fn_end",          "}"),
    ("prelude",         "{{ imports }}"),
    ("import_math",     ""),
    ("class_start",     "class {{ class_name }} {"),
    ("class_end",       "}"),
    ("main",            "    public static void main(String[] args) {\n        double[] features = new double[args.length];\n        for (int i = 0; i < args.length; i++) {\n            features[i] = Double.parseDouble(args[i]);\n        }\n        {{ print }}\n    }"),
    ("print_int",       "System.out.println({{ method }}(features));"),
    ("print_double",    "System.out.println({{ method }}(features));"),
    ("result[]",        "{{ type }}[] {{ name }} = new {{ type }}[{{ n }}];"),
    ("array_type",      "{{ value }}[]"),
    ("print_proba",     "System.out.println(java.util.Arrays.stream({{ method }}(features)).mapToObj(Double::toString).collect(java.util.stream.Collectors.joining(\" \")));"),

    ("exp",             "Math.exp({{ x }})"),
    ("log",             "Math.log({{ x }})"),
    ("sqrt",            "Math.sqrt({{ x }})"),
    ("abs",             "Math.abs({{ x }})"),
    ("tanh",            "Math.tanh({{ x }})"),
    ("pow",             "Math.pow({{ a }}, {{ b }})"),
];

pub(super) fn definition() -> LanguageDefinition {
    LanguageDefinition::new(
        "java",
        "Java",
        "java",
        &["java", "javac"],
        Some("javac -d {{ dest_dir }} {{ src_path }}"),
        "java -classpath {{ dest_dir }} {{ class_name }}",
        TEMPLATES,
    )
    .with_int_bits(Some(32))
    .with_class_stem()
    .with_reserved(&[
        "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class",
        "const", "continue", "default", "do", "double", "else", "enum", "extends", "final",
        "finally", "float", "for", "goto", "if", "implements", "import", "instanceof", "int",
        "interface", "long", "native", "new", "package", "private", "protected", "public",
        "return", "short", "static", "strictfp", "super", "switch", "synchronized", "this",
        "throw", "throws", "transient", "try", "void", "volatile", "while", "true", "false",
        "null", "var", "record", "yield",
        "Math", "String", "System", "Double", "Object", "Integer",
    ])
}
