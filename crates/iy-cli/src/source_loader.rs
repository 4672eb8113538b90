use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use iy_core::IdleError;
use regex::Regex;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::{
    map_cli_source_path, map_cli_source_read, map_cli_source_scan, LoadedMods,
    BUILTIN_MODS_REF, MODS_DIR_REF_PREFIX,
};

const DEFAULT_SCRIPT: &str = include_str!("../assets/default.txt");
pub(crate) const DEFAULT_SCRIPT_PATH: &str = "builtin/default.txt";

fn header_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^===\s*(\S.*)$").expect("header regex must compile"))
}

fn show_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^!\s*show\s+(\S.*)$").expect("show regex must compile"))
}

pub(crate) fn load_mods(mods_dir: Option<&str>) -> Result<LoadedMods, IdleError> {
    match mods_dir {
        Some(mods_dir) => load_mods_by_dir(mods_dir),
        None => Ok(load_builtin_mods()),
    }
}

pub(crate) fn load_builtin_mods() -> LoadedMods {
    LoadedMods {
        id: BUILTIN_MODS_REF.to_string(),
        sources: builtin_sources(),
    }
}

fn builtin_sources() -> BTreeMap<String, String> {
    BTreeMap::from([(DEFAULT_SCRIPT_PATH.to_string(), DEFAULT_SCRIPT.to_string())])
}

/// Loads every mod under `mods_dir`. A directory without any script falls
/// back to the built-in script.
pub(crate) fn load_mods_by_dir(mods_dir: &str) -> Result<LoadedMods, IdleError> {
    let mods_root = resolve_mods_dir(mods_dir)?;
    let mut sources = read_mod_scripts_from_dir(&mods_root)?;
    if sources.is_empty() {
        info!(mods_dir = %mods_root.display(), "no mod scripts found, using built-in script");
        sources = builtin_sources();
    }
    Ok(LoadedMods {
        id: make_mods_dir_ref(&mods_root),
        sources,
    })
}

pub(crate) fn load_mods_by_ref(mods_ref: &str) -> Result<LoadedMods, IdleError> {
    if mods_ref == BUILTIN_MODS_REF {
        return Ok(load_builtin_mods());
    }
    match mods_ref.strip_prefix(MODS_DIR_REF_PREFIX) {
        Some(raw) => load_mods_by_dir(raw),
        None => Err(IdleError::new(
            "CLI_SOURCE_REF_INVALID",
            format!("Unsupported mods ref: {}", mods_ref),
        )),
    }
}

pub(crate) fn resolve_mods_dir(mods_dir: &str) -> Result<PathBuf, IdleError> {
    let path = PathBuf::from(mods_dir);
    let absolute = if path.is_absolute() {
        path
    } else {
        std::env::current_dir()
            .map_err(map_cli_source_path)?
            .join(path)
    };

    if !absolute.exists() {
        return Err(IdleError::new(
            "CLI_SOURCE_NOT_FOUND",
            format!("mods-dir does not exist: {}", absolute.display()),
        ));
    }

    if !absolute.is_dir() {
        return Err(IdleError::new(
            "CLI_SOURCE_NOT_DIR",
            format!("mods-dir is not a directory: {}", absolute.display()),
        ));
    }

    Ok(absolute)
}

/// Collects `*.txt` files that sit directly in a `scripts` directory. Files of
/// `<root>/<mod>/scripts/` are namespaced with `<mod>`; `<root>/scripts/` is not.
pub(crate) fn read_mod_scripts_from_dir(
    mods_root: &Path,
) -> Result<BTreeMap<String, String>, IdleError> {
    let mut sources = BTreeMap::new();

    for entry in WalkDir::new(mods_root)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let is_txt = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));
        let Some(scripts_dir) = path.parent() else {
            continue;
        };
        if !is_txt || scripts_dir.file_name().and_then(|name| name.to_str()) != Some("scripts") {
            continue;
        }

        let relative = path
            .strip_prefix(mods_root)
            .map_err(map_cli_source_scan)?
            .to_string_lossy()
            .replace('\\', "/");

        let content = fs::read_to_string(path).map_err(map_cli_source_read)?;
        let content = match mod_name_for(mods_root, scripts_dir) {
            Some(mod_name) => {
                debug!(file = %relative, mod_name = %mod_name, "namespacing mod script");
                namespace_mod_source(&mod_name, &content)
            }
            None => content,
        };
        sources.insert(relative, content);
    }

    Ok(sources)
}

fn mod_name_for(mods_root: &Path, scripts_dir: &Path) -> Option<String> {
    let mod_dir = scripts_dir.parent()?;
    if mod_dir == mods_root {
        return None;
    }
    mod_dir
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
}

/// Prefixes event names, image paths and choice/button targets with `mod_name`.
pub(crate) fn namespace_mod_source(mod_name: &str, source: &str) -> String {
    let mut output = String::with_capacity(source.len() + 64);
    for line in source.lines() {
        let trimmed = line.trim();
        if let Some(captures) = header_regex().captures(trimmed) {
            output.push_str(&format!("=== {}/{}", mod_name, captures[1].trim()));
        } else if let Some(captures) = show_regex().captures(trimmed) {
            output.push_str(&format!("! show {}/images/{}", mod_name, captures[1].trim()));
        } else if (trimmed.starts_with('+') || trimmed.starts_with('*'))
            && trimmed.matches("->").count() == 1
        {
            let (label, target) = trimmed.split_once("->").unwrap_or((trimmed, ""));
            output.push_str(&format!(
                "{} -> {}/{}",
                label.trim(),
                mod_name,
                target.trim()
            ));
        } else {
            output.push_str(line);
        }
        output.push('\n');
    }
    output
}

pub(crate) fn make_mods_dir_ref(mods_root: &Path) -> String {
    format!("{}{}", MODS_DIR_REF_PREFIX, mods_root.display())
}

#[cfg(test)]
mod source_loader_tests {
    use super::*;
    use crate::cli_test_support::*;

    #[test]
    fn load_mods_by_ref_validates_ref_prefix() {
        let error = load_mods_by_ref("unknown:main").expect_err("invalid ref should fail");
        assert_eq!(error.code, "CLI_SOURCE_REF_INVALID");

        let builtin = load_mods_by_ref(BUILTIN_MODS_REF).expect("builtin ref should load");
        assert!(builtin.sources.contains_key(DEFAULT_SCRIPT_PATH));
    }

    #[test]
    fn resolve_mods_dir_validates_existence_and_directory() {
        let missing = temp_path("missing-mods");
        let missing_err = resolve_mods_dir(missing.to_string_lossy().as_ref())
            .expect_err("missing path should fail");
        assert_eq!(missing_err.code, "CLI_SOURCE_NOT_FOUND");

        let file_path = temp_path("plain-file");
        write_file(&file_path, "x");
        let not_dir_err = resolve_mods_dir(file_path.to_string_lossy().as_ref())
            .expect_err("file path should fail");
        assert_eq!(not_dir_err.code, "CLI_SOURCE_NOT_DIR");
    }

    #[test]
    fn read_mod_scripts_only_takes_txt_files_in_scripts_dirs() {
        let root = temp_path("mods-scan");
        write_file(&root.join("scripts/base.txt"), "=== Base\n? true\n");
        write_file(&root.join("cooking/scripts/cook.TXT"), "=== Cook\n? true\n");
        write_file(&root.join("cooking/notes.txt"), "=== Ignored\n");
        write_file(&root.join("cooking/scripts/readme.md"), "ignored");

        let sources = read_mod_scripts_from_dir(&root).expect("scan should pass");
        assert_eq!(sources.len(), 2);
        assert_eq!(
            sources.get("scripts/base.txt").map(String::as_str),
            Some("=== Base\n? true\n")
        );
        assert!(sources
            .get("cooking/scripts/cook.TXT")
            .expect("mod script")
            .starts_with("=== cooking/Cook\n"));
    }

    #[test]
    fn empty_mods_dir_falls_back_to_builtin_script() {
        let root = temp_path("empty-mods");
        fs::create_dir_all(&root).expect("root should be created");

        let loaded =
            load_mods_by_dir(root.to_string_lossy().as_ref()).expect("fallback should load");
        assert!(loaded.id.starts_with(MODS_DIR_REF_PREFIX));
        assert_eq!(
            loaded.sources.keys().collect::<Vec<_>>(),
            vec![DEFAULT_SCRIPT_PATH]
        );
    }

    #[test]
    fn namespace_mod_source_prefixes_names_images_and_targets() {
        let source = "\
=== Gym
? money >= 10
! show gym.png
* money >= 5: Lift -> Lift
+ Work out -> Gym
- Work out
! print a -> b
# comment -> kept
";
        let namespaced = namespace_mod_source("fit", source);
        let lines = namespaced.lines().collect::<Vec<_>>();
        assert_eq!(
            lines,
            vec![
                "=== fit/Gym",
                "? money >= 10",
                "! show fit/images/gym.png",
                "* money >= 5: Lift -> fit/Lift",
                "+ Work out -> fit/Gym",
                "- Work out",
                "! print a -> b",
                "# comment -> kept",
            ]
        );
    }

    #[test]
    fn namespace_mod_source_leaves_ambiguous_arrows_alone() {
        let namespaced = namespace_mod_source("m", "+ a -> b -> c\n");
        assert_eq!(namespaced, "+ a -> b -> c\n");
    }

    #[test]
    fn builtin_script_compiles_cleanly() {
        let loaded = load_builtin_mods();
        let compiled = iy_api::compile_sources(&loaded.sources).expect("builtin should compile");
        assert!(compiled.rejected.is_empty());
        assert!(!compiled.events.is_empty());
    }
}
