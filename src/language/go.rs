use super::LanguageDefinition;

#[rustfmt::skip]
const TEMPLATES: &[(&str, &str)] = &[
    ("init",            "{{ name }} := {{ value }}"),
    ("if",              "if {{ a }} {{ op }} {{ b }} {"),
    ("else",            "} else {"),
    ("endif",           "}"),
    ("indent",          "\t"),
    ("join",            ""),
    ("type",            "{{ value }}"),
    ("in_brackets",     "{{{ value }}}"),
    ("arr[]",           "{{ name }} := []{{ type }}{{ values }}"),
    ("arr[][]",         "{{ name }} := [][]{{ type }}{{ values }}"),
    ("arr[][][]",       "{{ name }} := [][][]{{ type }}{{ values }}"),
    ("int",             "int"),
    ("double",          "float64"),

    ("ref",             "{{ name }}"),
    ("global_ref",      "{{ name }}"),
    ("use_global",      ""),
    ("index",           "{{ array }}[{{ i }}]"),
    ("set",             "{{ target }} = {{ value }}"),
    ("return",          "return {{ value }}"),
    ("for",             "for {{ i }} := {{ start }}; {{ i }} < {{ end }}; {{ i }}++ {"),
    ("endfor",          "}"),
    ("while",           "for {{ a }} {{ op }} {{ b }} {"),
    ("endwhile",        "}"),
    ("zeros[]",         "{{ name }} := make([]{{ type }}, {{ n }})"),
    ("global_arr[]",    "var {{ name }} = []{{ type }}{{ values }}"),
    ("global_arr[][]",  "var {{ name }} = [][]{{ type }}{{ values }}"),
    ("global_arr[][][]", "var {{ name }} = [][][]{{ type }}{{ values }}"),
    ("fn_start",        "func {{ name }}({{ param }} []float64) {{ type }} {"),
    ("fn_end",          "}"),
    ("prelude",         "package main\n\nimport (\n\t\"fmt\"\n\t\"os\"\n\t\"strconv\"{{ imports }}\n)"),
    ("import_math",     "\n\t\"math\""),
    ("class_start",     ""),
    ("class_end",       ""),
    ("main",            "func main() {\n{{ load }}\targs := os.Args[1+{{ offset }}:]\n\tfeatures := make([]float64, len(args))\n\tfor i, arg := range args {\n\t\tfeatures[i], _ = strconv.ParseFloat(arg, 64)\n\t}\n\t{{ print }}\n}"),
    ("print_int",       "fmt.Println({{ method }}(features))"),
    ("print_double",    "fmt.Println({{ method }}(features))"),
    ("result[]",        "{{ name }} := make([]{{ type }}, {{ n }})"),
    ("array_type",      "[]{{ value }}"),
    ("print_proba",     "for i, p := range {{ method }}(features) {\n\t\tif i > 0 {\n\t\t\tfmt.Print(\" \")\n\t\t}\n\t\tfmt.Print(p)\n\t}\n\tfmt.Println()"),

    ("exp",             "math.Exp({{ x }})"),
    ("log",             "math.Log({{ x }})"),
    ("sqrt",            "math.Sqrt({{ x }})"),
    ("abs",             "math.Abs({{ x }})"),
    ("tanh",            "math.Tanh({{ x }})"),
    ("pow",             "math.Pow({{ a }}, {{ b }})"),

    ("import_json",     "\n\t\"encoding/json\""),
    ("decl[]",          "var {{ name }} []{{ type }}"),
    ("decl[][]",        "var {{ name }} [][]{{ type }}"),
    ("decl[][][]",      "var {{ name }} [][][]{{ type }}"),
    ("load_start",      "func loadData(path string) {\n\traw, err := os.ReadFile(path)\n\tif err != nil {\n\t\tpanic(err)\n\t}\n\tvar data struct {"),
    ("load_field[]",    "\t\tF{{ index }} []{{ type }} `json:\"{{ name }}\"`"),
    ("load_field[][]",  "\t\tF{{ index }} [][]{{ type }} `json:\"{{ name }}\"`"),
    ("load_field[][][]", "\t\tF{{ index }} [][][]{{ type }} `json:\"{{ name }}\"`"),
    ("load_mid",        "\t}\n\tif err := json.Unmarshal(raw, &data); err != nil {\n\t\tpanic(err)\n\t}"),
    ("load_assign",     "\t{{ name }} = data.F{{ index }}"),
    ("load_end",        "}"),
    ("load_call",       "\tloadData(os.Args[1])"),
];

pub(super) fn definition() -> LanguageDefinition {
    LanguageDefinition::new(
        "go",
        "Go",
        "go",
        &["go"],
        Some("go build -o {{ dest_path }} {{ src_path }}"),
        "{{ dest_path }}",
        TEMPLATES,
    )
    .with_reserved(&[
        "break", "case", "chan", "const", "continue", "default", "defer", "else",
        "fallthrough", "for", "func", "go", "goto", "if", "import", "interface", "map",
        "package", "range", "return", "select", "struct", "switch", "type", "var",
        "append", "cap", "len", "make", "new", "panic", "int", "float64", "string",
        "fmt", "os", "strconv", "math", "json",
    ])
}
