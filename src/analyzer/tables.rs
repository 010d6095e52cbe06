//! Static lookup tables for language, framework and topic detection.
//!
//! The tables are plain data. The analyzer holds them behind an `Arc` and
//! never mutates them, so alternate tables can be substituted in tests or
//! by embedders.

use std::collections::{HashMap, HashSet};

/// How a manifest file is searched for dependency names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    /// npm `package.json`: keys of `dependencies` and `devDependencies`
    PackageJson,
    /// Any text manifest: case-insensitive substring search over the content
    PlainText,
}

/// Framework detection rule for one manifest file.
#[derive(Debug, Clone)]
pub struct ManifestRule {
    /// File name relative to the repository root
    pub file: String,
    pub kind: ManifestKind,
    /// Tool reported whenever the file exists (e.g. `Cargo`, `Maven`)
    pub presence: Option<String>,
    /// Lower-case needle -> framework name
    pub dependencies: Vec<(String, String)>,
}

/// Something whose presence at the repository root signals a tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marker {
    /// File or directory relative to the repository root
    Path(String),
    /// Any root-level file with this extension
    Extension(String),
}

/// Label emitted when any of the markers is present.
#[derive(Debug, Clone)]
pub struct MarkerRule {
    pub any_of: Vec<Marker>,
    pub label: String,
}

/// All detection tables used by the analyzer.
#[derive(Debug, Clone)]
pub struct HeuristicTables {
    /// Lower-case extension (no dot) -> language name
    pub extension_languages: HashMap<String, String>,
    /// Language for files whose extension is not in the table
    pub fallback_language: String,
    /// Directory names whose contents are never counted
    pub ignored_dirs: HashSet<String>,
    /// Binary or compiled extensions that are never counted
    pub ignored_extensions: HashSet<String>,
    /// Extensions still counted when the file name is hidden
    pub hidden_source_extensions: HashSet<String>,
    /// README candidates in priority order
    pub readme_names: Vec<String>,
    pub manifest_rules: Vec<ManifestRule>,
    /// Container, orchestration and infrastructure tooling
    pub marker_rules: Vec<MarkerRule>,
    /// Directory that must exist before topics are inferred
    pub topic_gate: String,
    pub topic_rules: Vec<MarkerRule>,
}

impl HeuristicTables {
    /// Language for an extension (without the dot).
    pub fn language_for_extension(&self, extension: Option<&str>) -> &str {
        extension
            .and_then(|ext| self.extension_languages.get(&ext.to_lowercase()))
            .map(String::as_str)
            .unwrap_or(&self.fallback_language)
    }
}

fn set(items: &[&str]) -> HashSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn marker_rule(paths: &[&str], label: &str) -> MarkerRule {
    MarkerRule {
        any_of: paths.iter().map(|p| Marker::Path(p.to_string())).collect(),
        label: label.to_string(),
    }
}

impl Default for HeuristicTables {
    fn default() -> Self {
        let extension_languages = [
            ("py", "Python"),
            ("js", "JavaScript"),
            ("jsx", "JavaScript"),
            ("ts", "TypeScript"),
            ("tsx", "TypeScript"),
            ("java", "Java"),
            ("c", "C"),
            ("h", "C"),
            ("cpp", "C++"),
            ("cc", "C++"),
            ("cxx", "C++"),
            ("hpp", "C++"),
            ("cs", "C#"),
            ("go", "Go"),
            ("rs", "Rust"),
            ("php", "PHP"),
            ("rb", "Ruby"),
            ("swift", "Swift"),
            ("kt", "Kotlin"),
            ("scala", "Scala"),
            ("r", "R"),
            ("m", "Objective-C"),
            ("mm", "Objective-C++"),
            ("dart", "Dart"),
            ("lua", "Lua"),
            ("pl", "Perl"),
            ("sh", "Shell"),
            ("bash", "Shell"),
            ("zsh", "Shell"),
            ("fish", "Shell"),
            ("ps1", "PowerShell"),
            ("sql", "SQL"),
            ("html", "HTML"),
            ("htm", "HTML"),
            ("css", "CSS"),
            ("scss", "SCSS"),
            ("sass", "Sass"),
            ("less", "Less"),
            ("vue", "Vue"),
            ("json", "JSON"),
            ("xml", "XML"),
            ("yaml", "YAML"),
            ("yml", "YAML"),
            ("toml", "TOML"),
            ("md", "Markdown"),
            ("tex", "LaTeX"),
        ]
        .iter()
        .map(|(ext, lang)| (ext.to_string(), lang.to_string()))
        .collect();

        let manifest_rules = vec![
            ManifestRule {
                file: "package.json".to_string(),
                kind: ManifestKind::PackageJson,
                presence: None,
                dependencies: pairs(&[
                    ("react", "React"),
                    ("vue", "Vue.js"),
                    ("angular", "Angular"),
                    ("express", "Express.js"),
                    ("next", "Next.js"),
                    ("nuxt", "Nuxt.js"),
                    ("svelte", "Svelte"),
                    ("gatsby", "Gatsby"),
                    ("webpack", "Webpack"),
                    ("vite", "Vite"),
                    ("typescript", "TypeScript"),
                    ("jest", "Jest"),
                    ("mocha", "Mocha"),
                    ("cypress", "Cypress"),
                ]),
            },
            ManifestRule {
                file: "requirements.txt".to_string(),
                kind: ManifestKind::PlainText,
                presence: None,
                dependencies: pairs(&[
                    ("django", "Django"),
                    ("flask", "Flask"),
                    ("fastapi", "FastAPI"),
                    ("tornado", "Tornado"),
                    ("pyramid", "Pyramid"),
                    ("pandas", "Pandas"),
                    ("numpy", "NumPy"),
                    ("scikit-learn", "Scikit-learn"),
                    ("tensorflow", "TensorFlow"),
                    ("torch", "PyTorch"),
                    ("keras", "Keras"),
                    ("requests", "Requests"),
                    ("selenium", "Selenium"),
                    ("pytest", "Pytest"),
                ]),
            },
            ManifestRule {
                file: "Cargo.toml".to_string(),
                kind: ManifestKind::PlainText,
                presence: Some("Cargo".to_string()),
                dependencies: pairs(&[("tokio", "Tokio"), ("serde", "Serde")]),
            },
            ManifestRule {
                file: "pom.xml".to_string(),
                kind: ManifestKind::PlainText,
                presence: Some("Maven".to_string()),
                dependencies: pairs(&[("spring", "Spring"), ("junit", "JUnit")]),
            },
            ManifestRule {
                file: "go.mod".to_string(),
                kind: ManifestKind::PlainText,
                presence: None,
                dependencies: pairs(&[
                    ("github.com/gin-gonic/gin", "Gin"),
                    ("github.com/labstack/echo", "Echo"),
                    ("github.com/spf13/cobra", "Cobra"),
                ]),
            },
        ];

        let marker_rules = vec![
            marker_rule(
                &["Dockerfile", "docker-compose.yml", "docker-compose.yaml"],
                "Docker",
            ),
            marker_rule(&["k8s", "kubernetes"], "Kubernetes"),
            MarkerRule {
                any_of: vec![Marker::Extension("tf".to_string())],
                label: "Terraform".to_string(),
            },
        ];

        let topic_rules = vec![
            marker_rule(&["Dockerfile"], "docker"),
            marker_rule(&[".github/workflows"], "github-actions"),
            marker_rule(&["requirements.txt"], "python"),
            marker_rule(&["package.json"], "javascript"),
            marker_rule(&["Cargo.toml"], "rust"),
        ];

        Self {
            extension_languages,
            fallback_language: "Other".to_string(),
            ignored_dirs: set(&[
                "__pycache__",
                ".git",
                "node_modules",
                ".venv",
                "venv",
                "env",
                "build",
                "dist",
            ]),
            ignored_extensions: set(&["pyc", "pyo", "pyd", "so", "dylib", "dll", "exe", "obj", "o"]),
            hidden_source_extensions: set(&["py", "js", "ts"]),
            readme_names: vec![
                "README.md".to_string(),
                "README.txt".to_string(),
                "README.rst".to_string(),
                "README".to_string(),
            ],
            manifest_rules,
            marker_rules,
            topic_gate: ".github".to_string(),
            topic_rules,
        }
    }
}
