use crate::languages::descriptor::LanguageDescriptor;

const JAVA_SOURCE: &str = "public class {job_id} {
    public static void main(String[] args) {
{code}
    }
}
";

const CSHARP_SOURCE: &str = "using System;
using System.Collections.Generic;
using System.Linq;

public static class {job_id}
{
    public static void Main(string[] args)
    {
{code}
    }
}
";

/// The languages available out of the box, in listing order.
pub fn builtin_languages() -> Vec<LanguageDescriptor> {
    vec![
        LanguageDescriptor::new("bash", &["sh", "shell"], "sh", "bash:5")
            .with_run(&["bash", "{file}"]),
        LanguageDescriptor::new("python", &["py", "python3"], "py", "python:3-alpine")
            .with_run(&["python3", "-u", "{file}"]),
        LanguageDescriptor::new("javascript", &["js", "node"], "js", "node:lts-alpine")
            .with_run(&["node", "{file}"]),
        LanguageDescriptor::new("ruby", &["rb"], "rb", "ruby:alpine").with_run(&["ruby", "{file}"]),
        LanguageDescriptor::new("go", &["golang"], "go", "golang:alpine")
            .with_run(&["go", "run", "{file}"]),
        LanguageDescriptor::new("c", &[], "c", "gcc:latest")
            .with_compile(&["gcc", "-O2", "-o", "{job_id}", "{file}", "-lm"])
            .with_run(&["./{job_id}"]),
        LanguageDescriptor::new("cpp", &["c++", "cxx"], "cpp", "gcc:latest")
            .with_compile(&["g++", "-O2", "-std=c++17", "-o", "{job_id}", "{file}"])
            .with_run(&["./{job_id}"]),
        LanguageDescriptor::new("rust", &["rs"], "rs", "rust:slim")
            .with_compile(&["rustc", "-O", "-o", "{job_id}", "{file}"])
            .with_run(&["./{job_id}"]),
        LanguageDescriptor::new("java", &[], "java", "eclipse-temurin:17")
            .with_source_template(JAVA_SOURCE)
            .with_compile(&["javac", "{file}"])
            .with_run(&["java", "{job_id}"]),
        LanguageDescriptor::new("csharp", &["cs", "c#"], "cs", "mono:latest")
            .with_source_template(CSHARP_SOURCE)
            .with_compile(&["mcs", "-out:{job_id}.exe", "{file}"])
            .with_run(&["mono", "{job_id}.exe"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_coupled_languages_embed_job_id() {
        for lang in builtin_languages().iter().filter(|l| l.id == "java" || l.id == "csharp") {
            let source = lang.render_source("System.out.println(1);", "AbCdEfGh");
            assert!(source.contains("class AbCdEfGh"), "{}", lang.id);
            assert!(source.contains("System.out.println(1);"));
            assert!(lang.is_compiled());
        }
    }

    #[test]
    fn test_every_language_has_a_run_command() {
        for lang in builtin_languages() {
            assert!(!lang.run.is_empty(), "{} has no run command", lang.id);
            assert!(!lang.extension.is_empty());
        }
    }
}
