//! Built-in lookup tables for [`ExtensionClassifier`](crate::ExtensionClassifier).

/// Lowercase file extension to language.
pub(crate) const EXTENSIONS: &[(&str, &str)] = &[
    ("c", "C"),
    ("h", "C"),
    ("cc", "C++"),
    ("cpp", "C++"),
    ("cxx", "C++"),
    ("hh", "C++"),
    ("hpp", "C++"),
    ("cs", "C#"),
    ("clj", "Clojure"),
    ("cljs", "Clojure"),
    ("css", "CSS"),
    ("dart", "Dart"),
    ("ex", "Elixir"),
    ("exs", "Elixir"),
    ("erl", "Erlang"),
    ("fs", "F#"),
    ("go", "Go"),
    ("groovy", "Groovy"),
    ("hs", "Haskell"),
    ("html", "HTML"),
    ("htm", "HTML"),
    ("java", "Java"),
    ("js", "JavaScript"),
    ("mjs", "JavaScript"),
    ("cjs", "JavaScript"),
    ("jsx", "JavaScript"),
    ("jl", "Julia"),
    ("kt", "Kotlin"),
    ("kts", "Kotlin"),
    ("lua", "Lua"),
    ("m", "Objective-C"),
    ("mm", "Objective-C++"),
    ("ml", "OCaml"),
    ("mli", "OCaml"),
    ("pl", "Perl"),
    ("pm", "Perl"),
    ("php", "PHP"),
    ("ps1", "PowerShell"),
    ("py", "Python"),
    ("pyi", "Python"),
    ("r", "R"),
    ("rb", "Ruby"),
    ("rake", "Ruby"),
    ("rs", "Rust"),
    ("scala", "Scala"),
    ("scss", "SCSS"),
    ("sh", "Shell"),
    ("bash", "Shell"),
    ("zsh", "Shell"),
    ("sql", "SQL"),
    ("swift", "Swift"),
    ("tcl", "Tcl"),
    ("tf", "HCL"),
    ("ts", "TypeScript"),
    ("tsx", "TypeScript"),
    ("v", "Verilog"),
    ("sv", "SystemVerilog"),
    ("vhd", "VHDL"),
    ("vhdl", "VHDL"),
    ("vue", "Vue"),
    ("zig", "Zig"),
];

/// Exact file name to language.
pub(crate) const FILENAMES: &[(&str, &str)] = &[
    ("CMakeLists.txt", "CMake"),
    ("Dockerfile", "Dockerfile"),
    ("GNUmakefile", "Makefile"),
    ("Gemfile", "Ruby"),
    ("Jenkinsfile", "Groovy"),
    ("Makefile", "Makefile"),
    ("Rakefile", "Ruby"),
    ("makefile", "Makefile"),
];

/// Directory names whose contents are third-party code.
pub(crate) const VENDORED_DIRS: &[&str] = &[
    ".yarn",
    "Carthage",
    "Pods",
    "bower_components",
    "node_modules",
    "third-party",
    "third_party",
    "vendor",
];

/// File names produced by package managers and code generators.
pub(crate) const GENERATED_FILENAMES: &[&str] = &[
    "Cargo.lock",
    "Gemfile.lock",
    "composer.lock",
    "go.sum",
    "package-lock.json",
    "pnpm-lock.yaml",
    "poetry.lock",
    "yarn.lock",
];

/// File name suffixes produced by minifiers and code generators.
pub(crate) const GENERATED_SUFFIXES: &[&str] = &[
    ".designer.cs",
    ".min.css",
    ".min.js",
    ".pb.go",
    "_pb2.py",
];

/// Top-level directories holding documentation.
pub(crate) const DOC_DIRS: &[&str] = &["Documentation", "doc", "docs"];

/// Uppercase file stems of conventional prose files.
pub(crate) const DOC_STEMS: &[&str] = &["CHANGELOG", "CONTRIBUTING", "COPYING", "LICENSE", "README"];

/// Lowercase extensions of prose formats.
pub(crate) const DOC_EXTENSIONS: &[&str] = &["adoc", "markdown", "md", "rst", "txt"];

/// Interpreter name (version suffix stripped) to language.
pub(crate) const INTERPRETERS: &[(&str, &str)] = &[
    ("bash", "Shell"),
    ("dash", "Shell"),
    ("deno", "TypeScript"),
    ("ksh", "Shell"),
    ("lua", "Lua"),
    ("node", "JavaScript"),
    ("nodejs", "JavaScript"),
    ("perl", "Perl"),
    ("php", "PHP"),
    ("python", "Python"),
    ("Rscript", "R"),
    ("ruby", "Ruby"),
    ("sh", "Shell"),
    ("tclsh", "Tcl"),
    ("zsh", "Shell"),
];

/// Looks up a key in one of the pair tables.
pub(crate) fn lookup(table: &'static [(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}
