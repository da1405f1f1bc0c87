use std::sync::LazyLock;

/// Keyword variants (lowercase) and the canonical skill they normalize to.
///
/// Order matters: extraction reports skills in the order their first
/// matching variant appears here.
const VARIANTS: &[(&str, &str)] = &[
    // Languages
    ("javascript", "JavaScript"),
    ("js", "JavaScript"),
    ("typescript", "TypeScript"),
    ("ts", "TypeScript"),
    ("python", "Python"),
    ("java", "Java"),
    ("core java", "Java"),
    ("j2ee", "Java EE"),
    ("golang", "Go"),
    ("go", "Go"),
    ("c++", "C++"),
    ("c#", "C#"),
    ("c sharp", "C#"),
    ("csharp", "C#"),
    // Platforms
    ("dot net", ".NET"),
    (".net", ".NET"),
    ("dotnet", ".NET"),
    ("asp.net", "ASP.NET"),
    ("nodejs", "Node.js"),
    ("node js", "Node.js"),
    ("node.js", "Node.js"),
    // Frameworks
    ("reactjs", "React"),
    ("react js", "React"),
    ("react.js", "React"),
    ("react", "React"),
    ("angular", "Angular"),
    ("angularjs", "Angular"),
    ("vuejs", "Vue.js"),
    ("vue js", "Vue.js"),
    ("vue.js", "Vue.js"),
    ("vue", "Vue.js"),
    ("express", "Express.js"),
    ("expressjs", "Express.js"),
    ("express.js", "Express.js"),
    ("django", "Django"),
    ("flask", "Flask"),
    ("spring", "Spring"),
    ("spring boot", "Spring Boot"),
    ("springboot", "Spring Boot"),
    ("hibernate", "Hibernate"),
    // Datastores
    ("mysql", "MySQL"),
    ("postgresql", "PostgreSQL"),
    ("postgres", "PostgreSQL"),
    ("mongodb", "MongoDB"),
    ("mongo db", "MongoDB"),
    ("sql server", "SQL Server"),
    ("mssql", "SQL Server"),
    ("oracle", "Oracle"),
    ("redis", "Redis"),
    ("elasticsearch", "Elasticsearch"),
    // Cloud and delivery
    ("aws", "AWS"),
    ("amazon web services", "AWS"),
    ("azure", "Azure"),
    ("gcp", "GCP"),
    ("google cloud", "GCP"),
    ("docker", "Docker"),
    ("kubernetes", "Kubernetes"),
    ("k8s", "Kubernetes"),
    ("terraform", "Terraform"),
    ("jenkins", "Jenkins"),
    ("git", "Git"),
    ("github", "GitHub"),
    ("gitlab", "GitLab"),
    ("ci/cd", "CI/CD"),
    ("cicd", "CI/CD"),
    ("devops", "DevOps"),
    // Data and AI
    ("machine learning", "Machine Learning"),
    ("ml", "Machine Learning"),
    ("deep learning", "Deep Learning"),
    ("ai", "AI"),
    ("artificial intelligence", "AI"),
    ("data science", "Data Science"),
    // Web
    ("html", "HTML"),
    ("html5", "HTML5"),
    ("css", "CSS"),
    ("css3", "CSS3"),
    ("sass", "SASS"),
    ("scss", "SASS"),
    ("less", "LESS"),
    ("bootstrap", "Bootstrap"),
    ("tailwind", "Tailwind CSS"),
    ("jquery", "jQuery"),
    ("rest api", "REST API"),
    ("restful", "REST API"),
    ("graphql", "GraphQL"),
    ("microservices", "Microservices"),
    // Process
    ("agile", "Agile"),
    ("scrum", "Scrum"),
    ("jira", "Jira"),
];

/// Variants longer than the short-key cutoff that are also everyday English
/// words, so plain containment would fire on ordinary prose.
const COMMON_WORDS: &[&str] = &["less", "express", "spring"];

/// Variants of this many characters or fewer are matched on boundaries only.
pub const SHORT_KEY_MAX_CHARS: usize = 3;

static TAXONOMY: LazyLock<Taxonomy> = LazyLock::new(|| Taxonomy::new(VARIANTS, COMMON_WORDS));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    /// Plain substring containment.
    Contains,
    /// Must sit between delimiter characters (see `extractor::has_bounded`).
    Bounded,
}

#[derive(Debug, Clone)]
pub struct Entry {
    pub variant: String,
    pub canonical: &'static str,
    pub strategy: MatchStrategy,
}

/// Read-only variant -> canonical skill table.
#[derive(Debug)]
pub struct Taxonomy {
    entries: Vec<Entry>,
}

impl Taxonomy {
    /// The process-wide table, built on first use.
    pub fn global() -> &'static Taxonomy {
        &TAXONOMY
    }

    pub fn new(variants: &[(&str, &'static str)], common_words: &[&str]) -> Self {
        let entries = variants
            .iter()
            .map(|&(variant, canonical)| {
                let variant = variant.to_lowercase();
                let strategy = if variant.chars().count() <= SHORT_KEY_MAX_CHARS
                    || common_words.contains(&variant.as_str())
                {
                    MatchStrategy::Bounded
                } else {
                    MatchStrategy::Contains
                };
                Entry {
                    variant,
                    canonical,
                    strategy,
                }
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    #[cfg(test)]
    fn canonical(&self, variant: &str) -> Option<&'static str> {
        let variant = variant.to_lowercase();
        self.entries
            .iter()
            .find(|e| e.variant == variant)
            .map(|e| e.canonical)
    }
}
