use crate::config::types::LanguageConfig;
use crate::languages::template;

/// An argv template; each element is rendered on its own, never through a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate(Vec<String>);

impl CommandTemplate {
    pub fn new<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(argv.into_iter().map(Into::into).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }

    /// Fill `{file}` and `{job_id}` in every argument.
    pub fn render(&self, file: &str, job_id: &str) -> Vec<String> {
        self.0
            .iter()
            .map(|arg| template::render(arg, &[("file", file), ("job_id", job_id)]))
            .collect()
    }
}

/// Whether a language needs a compile step before it can run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageKind {
    Interpreted,
    Compiled { compile: CommandTemplate },
}

/// Static description of how to stage, compile and run one language.
///
/// For symbol-coupled languages (Java, C#) the source template names a type
/// after `{job_id}`, so the job identifier must be a valid identifier in that
/// language as well as a valid file stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageDescriptor {
    pub id: String,
    pub aliases: Vec<String>,
    pub extension: String,
    pub image: String,
    pub source_template: String,
    pub run: CommandTemplate,
    pub kind: LanguageKind,
}

impl LanguageDescriptor {
    pub fn new(id: &str, aliases: &[&str], extension: &str, image: &str) -> Self {
        Self {
            id: id.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            extension: extension.to_string(),
            image: image.to_string(),
            source_template: "{code}".to_string(),
            run: CommandTemplate::new(Vec::<String>::new()),
            kind: LanguageKind::Interpreted,
        }
    }

    pub fn with_source_template(mut self, template: &str) -> Self {
        self.source_template = template.to_string();
        self
    }

    pub fn with_run(mut self, argv: &[&str]) -> Self {
        self.run = CommandTemplate::new(argv.iter().copied());
        self
    }

    pub fn with_compile(mut self, argv: &[&str]) -> Self {
        self.kind = LanguageKind::Compiled {
            compile: CommandTemplate::new(argv.iter().copied()),
        };
        self
    }

    /// True when `name` is the id or one of the aliases, ignoring case.
    pub fn matches(&self, name: &str) -> bool {
        self.names().any(|n| n.eq_ignore_ascii_case(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.id.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    pub fn file_name(&self, job_id: &str) -> String {
        format!("{}.{}", job_id, self.extension)
    }

    pub fn render_source(&self, code: &str, job_id: &str) -> String {
        template::render(&self.source_template, &[("code", code), ("job_id", job_id)])
    }

    pub fn compile_command(&self, file: &str, job_id: &str) -> Option<Vec<String>> {
        match &self.kind {
            LanguageKind::Interpreted => None,
            LanguageKind::Compiled { compile } => Some(compile.render(file, job_id)),
        }
    }

    pub fn run_command(&self, file: &str, job_id: &str) -> Vec<String> {
        self.run.render(file, job_id)
    }

    pub fn is_compiled(&self) -> bool {
        matches!(self.kind, LanguageKind::Compiled { .. })
    }

    /// `id (alias, alias)` for user-facing listings
    pub fn summary(&self) -> String {
        if self.aliases.is_empty() {
            self.id.clone()
        } else {
            format!("{} ({})", self.id, self.aliases.join(", "))
        }
    }
}

impl From<LanguageConfig> for LanguageDescriptor {
    fn from(config: LanguageConfig) -> Self {
        let kind = match config.compile {
            Some(argv) => LanguageKind::Compiled {
                compile: CommandTemplate::new(argv),
            },
            None => LanguageKind::Interpreted,
        };

        Self {
            id: config.id,
            aliases: config.aliases,
            extension: config.extension,
            image: config.image,
            source_template: config.source_template,
            run: CommandTemplate::new(config.run),
            kind,
        }
    }
}
