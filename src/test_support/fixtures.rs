//! Fixtures for manifests on disk and git repositories.

use std::path::Path;

use crate::gomod::modfile::{render, GO_MOD};
use crate::gomod::types::{GoMod, Module, Replace, Require};

/// Write `gomod` as `dir/go.mod` in canonical form.
pub fn write_gomod(dir: &Path, gomod: &GoMod) {
    std::fs::write(dir.join(GO_MOD), render(gomod)).unwrap();
}

/// Read `dir/go.mod` back into its structured form.
pub fn read_gomod(dir: &Path) -> GoMod {
    let text = std::fs::read_to_string(dir.join(GO_MOD)).unwrap();
    parse_gomod(&text)
}

/// Parse `go.mod` text, in block or single-line form.
///
/// Only the directives mkrules reads are understood; anything else is
/// skipped.
pub fn parse_gomod(text: &str) -> GoMod {
    let mut gomod = GoMod::default();
    let mut block: Option<String> = None;

    for raw in text.lines() {
        let (line, comment) = match raw.find("//") {
            Some(i) => (&raw[..i], raw[i + 2..].trim()),
            None => (raw, ""),
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(verb) = &block {
            if line == ")" {
                block = None;
            } else {
                directive(&mut gomod, verb, line, comment);
            }
            continue;
        }

        let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        match verb {
            "module" => gomod.module.path = rest.to_string(),
            "go" => gomod.go = rest.to_string(),
            _ if rest == "(" => block = Some(verb.to_string()),
            _ => directive(&mut gomod, verb, rest, comment),
        }
    }
    gomod
}

fn directive(gomod: &mut GoMod, verb: &str, line: &str, comment: &str) {
    match verb {
        "require" => {
            let module = module(line);
            gomod.require.push(Require {
                path: module.path,
                version: module.version,
                indirect: comment == "indirect",
            });
        }
        "exclude" => gomod.exclude.push(module(line)),
        "replace" => {
            if let Some((old, new)) = line.split_once("=>") {
                gomod.replace.push(Replace {
                    old: module(old),
                    new: module(new),
                });
            }
        }
        _ => {}
    }
}

fn module(text: &str) -> Module {
    let mut fields = text.split_whitespace();
    let path = fields.next().unwrap_or_default();
    let version = fields.next().unwrap_or_default();
    Module::new(path, version)
}

/// Create a git repository in `dir` with one commit per entry of `messages`,
/// committed one minute apart, and return the commit ids in order.
pub fn git_repo(dir: &Path, messages: &[&str]) -> Vec<git2::Oid> {
    let repo = git2::Repository::init(dir).unwrap();
    let mut parents: Vec<git2::Oid> = Vec::new();

    for (i, message) in messages.iter().enumerate() {
        std::fs::write(dir.join("CHANGELOG"), format!("{}\n", message)).unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new("CHANGELOG")).unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();

        let time = git2::Time::new(1_600_000_000 + 60 * i as i64, 0);
        let sig = git2::Signature::new("mkrules", "mkrules@example.com", &time).unwrap();
        let parent = parents.last().map(|id| repo.find_commit(*id).unwrap());
        let parent_refs: Vec<&git2::Commit<'_>> = parent.iter().collect();

        let oid = repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
            .unwrap();
        parents.push(oid);
    }
    parents
}

/// Tag `commit` in the repository at `dir`, annotated when `annotated` is set.
pub fn git_tag(dir: &Path, name: &str, commit: git2::Oid, annotated: bool) {
    let repo = git2::Repository::open(dir).unwrap();
    let object = repo.find_object(commit, None).unwrap();
    if annotated {
        let time = git2::Time::new(1_700_000_000, 0);
        let sig = git2::Signature::new("mkrules", "mkrules@example.com", &time).unwrap();
        repo.tag(name, &object, &sig, name, false).unwrap();
    } else {
        repo.tag_lightweight(name, &object, false).unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_gomod_blocks() {
        let gomod = parse_gomod(
            "module example.com/app

go 1.16

require (
\tgithub.com/a/foo v1.0.0
\tgithub.com/b/bar v0.2.0 // indirect
)

replace (
\tgithub.com/a/foo => ../foo
\tgithub.com/b/bar v0.2.0 => github.com/c/bar v0.3.0
)
",
        );
        assert_eq!(gomod.module.path, "example.com/app");
        assert_eq!(gomod.go, "1.16");
        assert!(gomod.require[1].indirect);
        assert_eq!(gomod.replace[0].new, Module::new("../foo", ""));
        assert_eq!(gomod.replace[1].old, Module::new("github.com/b/bar", "v0.2.0"));
    }

    #[test]
    fn test_parse_gomod_single_line() {
        let gomod = parse_gomod(
            "module example.com/app\ngo 1.21\nrequire github.com/a/foo v1.0.0 // indirect\nexclude github.com/x/y v0.1.0\nreplace github.com/a/foo => github.com/b/foo v1.1.0\n",
        );
        assert_eq!(gomod.require, vec![Require::new("github.com/a/foo", "v1.0.0").indirect()]);
        assert_eq!(gomod.exclude, vec![Module::new("github.com/x/y", "v0.1.0")]);
        assert!(gomod.find_replace("github.com/a/foo").unwrap().renames());
    }

    #[test]
    fn test_render_parse() {
        let gomod = GoMod {
            module: Module::new("example.com/app", ""),
            go: "1.16".to_string(),
            require: vec![Require::new("a", "v1.0.0"), Require::new("b", "v1.0.0").indirect()],
            exclude: vec![],
            replace: vec![Replace::new("a", "../a", "")],
        };
        let tmp = tempfile::TempDir::new().unwrap();
        write_gomod(tmp.path(), &gomod);
        assert_eq!(read_gomod(tmp.path()), gomod);
    }
}
