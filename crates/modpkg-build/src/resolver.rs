//! Package resolution and auto-split expansion
//!
//! The resolver turns the declared package list into a flat, ordered list of
//! [`PackageDefinition`]s, each mapping 1:1 to one output artifact. A
//! manifest with `auto_split_mode: none` passes through unchanged; the other
//! modes decompose one manifest into several definitions:
//!
//! - `simple` emits one definition per Directory entry (the entry's
//!   `game_path` names both the source directory under `src/` and the
//!   artifact), plus a single `root` bundle for any File entries.
//! - `aggressive` additionally walks every nested subdirectory beneath each
//!   Directory entry and emits one definition per subtree, naming the
//!   artifact after the relative path with separators and dots replaced by
//!   `_`. Files sitting directly in the entry's folder become one per-folder
//!   bundle.
//!
//! Expansion order is deterministic: declared packages in declaration order,
//! Directory-derived definitions in entry order (sorted preorder for
//! aggressive), then file bundles. Directory listings are sorted, never left
//! in OS enumeration order.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::{
    AutoSplitMode, BuildConfig, BuildConfigPackage, PACKAGE_MANIFEST_NAME, PackageConfig,
    PackageEntry,
};
use crate::error::{BuildError, BuildResult};

/// Source name and distribution name of the synthetic File-entry bundle
const ROOT_BUNDLE_NAME: &str = "root";

/// A fully resolved build unit
///
/// Produced by the resolver, consumed by the change detector and builder,
/// discarded after the run. `config.auto_split_mode` is always `none` here.
#[derive(Debug, Clone)]
pub struct PackageDefinition {
    /// Cache key and source directory name under `<config_dir>/src/`
    pub source_name: String,

    /// Output file stem
    pub distribution_name: String,

    /// Resolved manifest for this unit
    pub config: PackageConfig,
}

impl PackageDefinition {
    /// Source directory for this definition: `<config_dir>/src/<source_name>`
    pub fn source_dir(&self, config_dir: &Path) -> PathBuf {
        source_dir(config_dir, &self.source_name)
    }

    /// Output file name, `<distribution_name>.mods`
    pub fn artifact_name(&self) -> String {
        format!("{}.mods", self.distribution_name)
    }
}

/// Source directory for a package name
///
/// Derived names may contain `/` segments (aggressive mode); each segment
/// becomes a path component.
pub fn source_dir(config_dir: &Path, source_name: &str) -> PathBuf {
    let mut dir = config_dir.join("src");
    for segment in source_name.split('/') {
        dir.push(segment);
    }
    dir
}

/// Expand every declared package into its build units
///
/// Loads each package's manifest from `<src_dir>/<source_name>/config.json`.
/// Aborts on the first missing or invalid manifest, before later packages
/// are considered.
pub fn resolve_packages(
    config_dir: &Path,
    build_config: &BuildConfig,
) -> BuildResult<Vec<PackageDefinition>> {
    let mut definitions = Vec::new();

    for declared in &build_config.packages {
        let manifest_path =
            source_dir(config_dir, &declared.source_name).join(PACKAGE_MANIFEST_NAME);
        let config = PackageConfig::load(&manifest_path, &declared.source_name)?;

        if config.auto_split_mode == AutoSplitMode::None {
            info!("compiling '{}' in single-file mode", declared.source_name);
        } else {
            info!("compiling '{}' in auto-split mode", declared.source_name);
        }

        definitions.extend(expand_package(config_dir, declared, config)?);
    }

    Ok(definitions)
}

/// Expand one declared package according to its manifest's auto-split mode
pub fn expand_package(
    config_dir: &Path,
    declared: &BuildConfigPackage,
    config: PackageConfig,
) -> BuildResult<Vec<PackageDefinition>> {
    if config.auto_split_mode == AutoSplitMode::None {
        return Ok(vec![PackageDefinition {
            source_name: declared.source_name.clone(),
            distribution_name: declared.distribution_name.clone(),
            config,
        }]);
    }

    auto_split(config_dir, declared, &config)
}

fn auto_split(
    config_dir: &Path,
    declared: &BuildConfigPackage,
    config: &PackageConfig,
) -> BuildResult<Vec<PackageDefinition>> {
    // Auto-split derives source directories from entry game paths, which
    // only works for root-level entries.
    if let Some(entry) = config
        .entries
        .iter()
        .find(|e| e.game_path().contains(['/', '\\']))
    {
        return Err(BuildError::NonRootEntry {
            package: declared.source_name.clone(),
            game_path: entry.game_path().to_string(),
        });
    }

    let base_dir = source_dir(config_dir, &declared.source_name);
    let mut definitions = Vec::new();
    let mut file_entries = Vec::new();

    for entry in &config.entries {
        match entry {
            PackageEntry::Directory {
                local_path,
                game_path,
            } => {
                if config.auto_split_mode == AutoSplitMode::Aggressive {
                    definitions.extend(split_directory_aggressive(
                        &base_dir,
                        declared,
                        local_path,
                        game_path,
                        config.encrypt_files,
                    )?);
                } else {
                    definitions.push(directory_definition(game_path, config.encrypt_files));
                }
            }
            PackageEntry::File { .. } => file_entries.push(entry.clone()),
        }
    }

    if !file_entries.is_empty() {
        definitions.push(PackageDefinition {
            source_name: ROOT_BUNDLE_NAME.to_string(),
            distribution_name: ROOT_BUNDLE_NAME.to_string(),
            config: PackageConfig {
                encrypt_files: config.encrypt_files,
                auto_split_mode: AutoSplitMode::None,
                entries: file_entries,
            },
        });
    }

    debug!(
        "package '{}' expanded into {} definitions",
        declared.source_name,
        definitions.len()
    );
    Ok(definitions)
}

/// One simple-mode definition: the Directory entry becomes its own package,
/// sourced from `src/<game_path>`
fn directory_definition(game_path: &str, encrypt_files: bool) -> PackageDefinition {
    PackageDefinition {
        source_name: game_path.to_string(),
        distribution_name: game_path.to_string(),
        config: PackageConfig {
            encrypt_files,
            auto_split_mode: AutoSplitMode::None,
            entries: vec![PackageEntry::Directory {
                local_path: String::new(),
                game_path: game_path.to_string(),
            }],
        },
    }
}

/// Aggressive-mode expansion of one Directory entry: a definition per nested
/// subdirectory, then a bundle for loose files directly inside the folder
fn split_directory_aggressive(
    base_dir: &Path,
    declared: &BuildConfigPackage,
    local_path: &str,
    game_path: &str,
    encrypt_files: bool,
) -> BuildResult<Vec<PackageDefinition>> {
    let folder = base_dir.join(local_path);
    if !folder.is_dir() {
        return Err(BuildError::MissingDirectory {
            package: declared.source_name.clone(),
            path: folder,
        });
    }

    let mut definitions = Vec::new();

    for subdir in nested_subdirectories(&folder)? {
        let relative = relative_name(base_dir, &subdir);
        definitions.push(PackageDefinition {
            source_name: format!("{}/{relative}", declared.source_name),
            distribution_name: relative.replace(['/', '.'], "_"),
            config: PackageConfig {
                encrypt_files,
                auto_split_mode: AutoSplitMode::None,
                entries: vec![PackageEntry::Directory {
                    local_path: String::new(),
                    game_path: relative,
                }],
            },
        });
    }

    let loose = loose_files(&folder)?;
    if !loose.is_empty() {
        let entries = loose
            .into_iter()
            .map(|file_name| {
                let game_path = relative_name(base_dir, &folder.join(&file_name));
                PackageEntry::File {
                    local_path: file_name,
                    game_path,
                }
            })
            .collect();

        definitions.push(PackageDefinition {
            source_name: format!("{}/{game_path}", declared.source_name),
            distribution_name: game_path.to_string(),
            config: PackageConfig {
                encrypt_files,
                auto_split_mode: AutoSplitMode::None,
                entries,
            },
        });
    }

    Ok(definitions)
}

/// All nested subdirectories of `root` in sorted preorder
///
/// Worklist traversal, no recursion, so arbitrarily deep trees cannot blow
/// the stack.
fn nested_subdirectories(root: &Path) -> BuildResult<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        if dir != root {
            found.push(dir.clone());
        }

        let mut children = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                children.push(entry.path());
            }
        }
        children.sort();

        // Pushed in reverse so the sorted order comes back off the stack.
        for child in children.into_iter().rev() {
            stack.push(child);
        }
    }

    Ok(found)
}

/// File names directly inside `dir` (no recursion), sorted
fn loose_files(dir: &Path) -> BuildResult<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// Path of `path` relative to `base`, `/`-separated
fn relative_name(base: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(base).unwrap_or(path);
    let mut name = String::new();
    for component in relative.components() {
        if !name.is_empty() {
            name.push('/');
        }
        name.push_str(&component.as_os_str().to_string_lossy());
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn declared(source_name: &str) -> BuildConfigPackage {
        BuildConfigPackage {
            source_name: source_name.to_string(),
            distribution_name: format!("{source_name}_dist"),
        }
    }

    fn directory_entry(name: &str) -> PackageEntry {
        PackageEntry::Directory {
            local_path: name.to_string(),
            game_path: name.to_string(),
        }
    }

    fn file_entry(name: &str) -> PackageEntry {
        PackageEntry::File {
            local_path: name.to_string(),
            game_path: name.to_string(),
        }
    }

    #[test]
    fn none_mode_passes_through() {
        let config = PackageConfig {
            encrypt_files: true,
            auto_split_mode: AutoSplitMode::None,
            entries: vec![file_entry("a.txt"), directory_entry("cars")],
        };

        let defs = expand_package(Path::new("."), &declared("tracks"), config).unwrap();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].source_name, "tracks");
        assert_eq!(defs[0].distribution_name, "tracks_dist");
        assert_eq!(defs[0].config.entries.len(), 2);
        assert!(defs[0].config.encrypt_files);
    }

    #[test]
    fn simple_mode_splits_directories_without_bundle() {
        let config = PackageConfig {
            encrypt_files: false,
            auto_split_mode: AutoSplitMode::Simple,
            entries: vec![directory_entry("a"), directory_entry("b")],
        };

        let defs = expand_package(Path::new("."), &declared("pkg"), config).unwrap();
        assert_eq!(defs.len(), 2, "no bundle artifact without file entries");

        for (def, name) in defs.iter().zip(["a", "b"]) {
            assert_eq!(def.source_name, name);
            assert_eq!(def.distribution_name, name);
            assert_eq!(def.config.auto_split_mode, AutoSplitMode::None);
            assert_eq!(
                def.config.entries,
                vec![PackageEntry::Directory {
                    local_path: String::new(),
                    game_path: name.to_string(),
                }]
            );
        }
    }

    #[test]
    fn simple_mode_bundles_file_entries_last() {
        let config = PackageConfig {
            encrypt_files: true,
            auto_split_mode: AutoSplitMode::Simple,
            entries: vec![file_entry("x.ini"), directory_entry("a"), file_entry("y.ini")],
        };

        let defs = expand_package(Path::new("."), &declared("pkg"), config).unwrap();
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].source_name, "a");

        let bundle = &defs[1];
        assert_eq!(bundle.source_name, "root");
        assert_eq!(bundle.distribution_name, "root");
        assert!(bundle.config.encrypt_files, "bundle inherits encryption");
        assert_eq!(
            bundle.config.entries,
            vec![file_entry("x.ini"), file_entry("y.ini")]
        );
    }

    #[test]
    fn auto_split_rejects_non_root_entries() {
        for game_path in ["sub/dir/file.txt", "sub\\file.txt"] {
            let config = PackageConfig {
                encrypt_files: false,
                auto_split_mode: AutoSplitMode::Simple,
                entries: vec![PackageEntry::File {
                    local_path: "file.txt".to_string(),
                    game_path: game_path.to_string(),
                }],
            };

            let err = expand_package(Path::new("."), &declared("pkg"), config).unwrap_err();
            match err {
                BuildError::NonRootEntry {
                    package,
                    game_path: offending,
                } => {
                    assert_eq!(package, "pkg");
                    assert_eq!(offending, game_path);
                }
                other => panic!("expected NonRootEntry, got {other:?}"),
            }
        }
    }

    #[test]
    fn aggressive_mode_splits_nested_subdirectories() {
        let tmp = tempfile::tempdir().unwrap();
        let base = tmp.path().join("src/pkg");
        fs::create_dir_all(base.join("cars/gtr/skins")).unwrap();
        fs::create_dir_all(base.join("cars/civic")).unwrap();
        fs::create_dir_all(base.join("cars/v1.2")).unwrap();
        fs::write(base.join("cars/readme.txt"), b"loose").unwrap();
        fs::write(base.join("cars/gtr/body.dds"), b"tex").unwrap();

        let config = PackageConfig {
            encrypt_files: false,
            auto_split_mode: AutoSplitMode::Aggressive,
            entries: vec![directory_entry("cars")],
        };

        let defs = expand_package(tmp.path(), &declared("pkg"), config).unwrap();

        let names: Vec<(&str, &str)> = defs
            .iter()
            .map(|d| (d.source_name.as_str(), d.distribution_name.as_str()))
            .collect();
        assert_eq!(
            names,
            vec![
                ("pkg/cars/civic", "cars_civic"),
                ("pkg/cars/gtr", "cars_gtr"),
                ("pkg/cars/gtr/skins", "cars_gtr_skins"),
                ("pkg/cars/v1.2", "cars_v1_2"),
                ("pkg/cars", "cars"),
            ]
        );

        // subtree definitions carry a single root directory entry
        assert_eq!(
            defs[0].config.entries,
            vec![PackageEntry::Directory {
                local_path: String::new(),
                game_path: "cars/civic".to_string(),
            }]
        );

        // the per-folder bundle lists loose files only
        assert_eq!(
            defs[4].config.entries,
            vec![PackageEntry::File {
                local_path: "readme.txt".to_string(),
                game_path: "cars/readme.txt".to_string(),
            }]
        );
    }

    #[test]
    fn aggressive_mode_missing_folder_is_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("src/pkg")).unwrap();

        let config = PackageConfig {
            encrypt_files: false,
            auto_split_mode: AutoSplitMode::Aggressive,
            entries: vec![directory_entry("cars")],
        };

        assert!(matches!(
            expand_package(tmp.path(), &declared("pkg"), config),
            Err(BuildError::MissingDirectory { .. })
        ));
    }

    #[test]
    fn derived_source_names_map_to_nested_directories() {
        let dir = source_dir(Path::new("/build"), "pkg/cars/gtr");
        assert_eq!(dir, Path::new("/build/src/pkg/cars/gtr"));
    }

    #[test]
    fn resolve_aborts_on_missing_manifest() {
        let tmp = tempfile::tempdir().unwrap();
        let build_config = BuildConfig {
            packages: vec![declared("ghost")],
            generate_index: false,
        };

        let err = resolve_packages(tmp.path(), &build_config).unwrap_err();
        match err {
            BuildError::PackageConfigNotFound { package, .. } => assert_eq!(package, "ghost"),
            other => panic!("expected PackageConfigNotFound, got {other:?}"),
        }
    }
}
