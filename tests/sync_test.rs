use std::fs;
use std::path::{Path, PathBuf};

use tempfile::{tempdir, TempDir};
use vcxsync::{run, Category, Outcome, ScanRules, SyncError, SyncOptions};

const PROJECT: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Project DefaultTargets="Build" ToolsVersion="12.0" xmlns="http://schemas.microsoft.com/developer/msbuild/2003">
  <ItemGroup Label="ProjectConfigurations">
    <ProjectConfiguration Include="Release|Win32">
      <Configuration>Release</Configuration>
      <Platform>Win32</Platform>
    </ProjectConfiguration>
  </ItemGroup>
  <Import Project="$(VCTargetsPath)\Microsoft.Cpp.Default.props" />
  <ItemGroup>
    <ClCompile Include="src\a.cpp" />
  </ItemGroup>
  <Import Project="$(VCTargetsPath)\Microsoft.Cpp.targets" />
</Project>
"#;

fn crlf(text: &str) -> String {
    text.replace('\n', "\r\n")
}

fn with_bom(text: &str) -> Vec<u8> {
    let mut bytes = "\u{feff}".as_bytes().to_vec();
    bytes.extend_from_slice(crlf(text).as_bytes());
    bytes
}

fn touch(root: &Path, rel: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, "// source\n").unwrap();
}

/// `src/a.cpp`, `inc/a.h`, `res/x.rc` with a project declaring only `src\a.cpp`.
fn sample_tree() -> (TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    touch(dir.path(), "src/a.cpp");
    touch(dir.path(), "inc/a.h");
    touch(dir.path(), "res/x.rc");
    let project = dir.path().join("app.vcxproj");
    fs::write(&project, with_bom(PROJECT)).unwrap();
    (dir, project)
}

fn options(root: &Path) -> SyncOptions {
    SyncOptions::new(root)
}

fn scan_only(root: &Path) -> SyncOptions {
    SyncOptions {
        scan_only: true,
        ..SyncOptions::new(root)
    }
}

fn backup_of(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}

#[test]
fn scan_only_reports_missing_files_without_writing() {
    let (dir, project) = sample_tree();
    let before = fs::read(&project).unwrap();

    let diffs = match run(&scan_only(dir.path())).unwrap() {
        Outcome::Scanned(diffs) => diffs,
        other => panic!("unexpected outcome: {other:?}"),
    };

    let header = diffs.iter().find(|d| d.category == Category::Header).unwrap();
    let source = diffs.iter().find(|d| d.category == Category::Source).unwrap();
    let resource = diffs.iter().find(|d| d.category == Category::Resource).unwrap();
    assert_eq!(header.project_missing, vec!["inc\\a.h"]);
    assert_eq!(resource.project_missing, vec!["res\\x.rc"]);
    assert!(source.project_missing.is_empty());
    assert!(diffs.iter().all(|d| d.project_extra.is_empty()));
    assert!(diffs.iter().all(|d| d.filter_extra.is_empty()));
    assert_eq!(source.filter_missing, vec!["src\\a.cpp"]);

    assert_eq!(fs::read(&project).unwrap(), before);
    assert!(!backup_of(&project).exists());
    assert!(!dir.path().join("app.vcxproj.filters").exists());
}

#[test]
fn update_then_rescan_is_clean() {
    let (dir, project) = sample_tree();

    assert!(matches!(run(&options(dir.path())).unwrap(), Outcome::Updated(_)));

    match run(&scan_only(dir.path())).unwrap() {
        Outcome::Scanned(diffs) => assert!(diffs.iter().all(|d| d.is_clean()), "{diffs:?}"),
        other => panic!("unexpected outcome: {other:?}"),
    }

    let text = fs::read_to_string(&project).unwrap();
    assert!(text.starts_with('\u{feff}'));
    assert!(text.contains("    <ClInclude Include=\"inc\\a.h\" />\r\n"));
    assert!(text.contains("    <ResourceCompile Include=\"res\\x.rc\" />\r\n"));
    assert_eq!(
        fs::read(backup_of(&project)).unwrap(),
        with_bom(PROJECT),
        "backup holds the original project"
    );
}

#[test]
fn update_preserves_unrelated_content() {
    let (dir, project) = sample_tree();
    run(&options(dir.path())).unwrap();

    let expected = PROJECT.replace(
        "    <ClCompile Include=\"src\\a.cpp\" />\n  </ItemGroup>\n",
        "    <ClCompile Include=\"src\\a.cpp\" />\n  </ItemGroup>\n  <ItemGroup>\n    <ClInclude Include=\"inc\\a.h\" />\n  </ItemGroup>\n  <ItemGroup>\n    <ResourceCompile Include=\"res\\x.rc\" />\n  </ItemGroup>\n",
    );
    assert_eq!(fs::read(&project).unwrap(), with_bom(&expected));
}

#[test]
fn writing_twice_is_byte_identical() {
    let (dir, project) = sample_tree();
    touch(dir.path(), "src/net/socket.cpp");

    run(&options(dir.path())).unwrap();
    let first = fs::read(&project).unwrap();
    let first_filters = fs::read(dir.path().join("app.vcxproj.filters")).unwrap();

    run(&options(dir.path())).unwrap();
    assert_eq!(fs::read(&project).unwrap(), first);
    assert_eq!(fs::read(backup_of(&project)).unwrap(), first);
    assert_eq!(
        fs::read(dir.path().join("app.vcxproj.filters")).unwrap(),
        first_filters
    );
}

#[test]
fn filter_file_is_created_from_the_tree() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "a.cpp");
    touch(dir.path(), "inc/a.h");
    touch(dir.path(), "res/x.rc");
    fs::write(dir.path().join("app.vcxproj"), with_bom(PROJECT)).unwrap();

    run(&options(dir.path())).unwrap();

    let filters = dir.path().join("app.vcxproj.filters");
    assert!(!backup_of(&filters).exists());
    let text = fs::read_to_string(&filters).unwrap();
    assert!(text.starts_with("\u{feff}<?xml"));
    assert!(text.contains("<Filter Include=\"Header Files\\inc\">"));
    assert!(text.contains("<Filter Include=\"Resource Files\\res\">"));
    assert!(!text.contains("<Filter Include=\"Source Files\\"));
    assert!(text.contains("<ClInclude Include=\"inc\\a.h\">\r\n      <Filter>Header Files\\inc</Filter>"));
    assert!(text.contains("<ResourceCompile Include=\"res\\x.rc\">\r\n      <Filter>Resource Files\\res</Filter>"));
    assert!(text.contains("<ClCompile Include=\"a.cpp\">\r\n      <Filter>Source Files</Filter>"));

    // The project's stale src\a.cpp entry is dropped in favour of the root file.
    let project = fs::read_to_string(dir.path().join("app.vcxproj")).unwrap();
    assert!(project.contains("<ClCompile Include=\"a.cpp\" />"));
    assert!(!project.contains("src\\a.cpp"));
}

#[test]
fn existing_filter_file_is_backed_up() {
    let (dir, _) = sample_tree();
    let filters = dir.path().join("app.vcxproj.filters");
    let old = crlf("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<Project>\n  <ItemGroup>\n    <ClCompile Include=\"gone.cpp\">\n      <Filter>Source Files</Filter>\n    </ClCompile>\n  </ItemGroup>\n</Project>\n");
    fs::write(&filters, &old).unwrap();

    match run(&scan_only(dir.path())).unwrap() {
        Outcome::Scanned(diffs) => {
            let source = diffs.iter().find(|d| d.category == Category::Source).unwrap();
            assert_eq!(source.filter_extra, vec!["gone.cpp"]);
            assert_eq!(source.filter_missing, vec!["src\\a.cpp"]);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    run(&options(dir.path())).unwrap();
    assert_eq!(fs::read_to_string(backup_of(&filters)).unwrap(), old);
    assert!(!fs::read_to_string(&filters).unwrap().contains("gone.cpp"));
}

#[test]
fn no_filter_leaves_filter_file_alone() {
    let (dir, _) = sample_tree();
    let opts = SyncOptions {
        no_filter: true,
        ..SyncOptions::new(dir.path())
    };
    run(&opts).unwrap();
    assert!(!dir.path().join("app.vcxproj.filters").exists());
}

#[test]
fn duplicate_compile_groups_abort_before_writing() {
    let (dir, project) = sample_tree();
    let broken = PROJECT.replace(
        "  <Import Project=\"$(VCTargetsPath)\\Microsoft.Cpp.targets\" />",
        "  <ItemGroup>\n    <ClCompile Include=\"src\\b.cpp\" />\n  </ItemGroup>\n  <Import Project=\"$(VCTargetsPath)\\Microsoft.Cpp.targets\" />",
    );
    fs::write(&project, with_bom(&broken)).unwrap();

    let err = run(&options(dir.path())).unwrap_err();
    match err.downcast_ref::<SyncError>() {
        Some(SyncError::AmbiguousGroups(kinds)) => assert_eq!(kinds, &vec![Category::Source]),
        _ => panic!("unexpected error: {err:#}"),
    }
    assert_eq!(fs::read(&project).unwrap(), with_bom(&broken));
    assert!(!backup_of(&project).exists());
    assert!(!dir.path().join("app.vcxproj.filters").exists());
}

#[test]
fn unclosed_last_group_aborts_before_writing() {
    let (dir, project) = sample_tree();
    let broken = "<Project>\n  <ItemGroup>\n    <ClCompile Include=\"src\\a.cpp\" />\n</Project>\n";
    fs::write(&project, with_bom(broken)).unwrap();

    let err = run(&options(dir.path())).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SyncError>(),
        Some(SyncError::MissingStructure(_))
    ));
    assert!(!backup_of(&project).exists());
    assert!(!dir.path().join("app.vcxproj.filters").exists());
}

#[test]
fn inline_closed_group_aborts_before_writing() {
    let (dir, project) = sample_tree();
    let broken = PROJECT.replace(
        "  <ItemGroup>\n    <ClCompile Include=\"src\\a.cpp\" />\n  </ItemGroup>\n",
        "  <ItemGroup><ClCompile Include=\"src\\a.cpp\" /></ItemGroup>\n  <PropertyGroup><Keep>1</Keep></PropertyGroup>\n  <ItemGroup>\n    <ClInclude Include=\"inc\\a.h\" />\n  </ItemGroup>\n",
    );
    assert_ne!(broken, PROJECT);
    fs::write(&project, with_bom(&broken)).unwrap();

    let err = run(&options(dir.path())).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SyncError>(),
        Some(SyncError::MissingStructure(_))
    ));
    assert_eq!(fs::read(&project).unwrap(), with_bom(&broken));
    assert!(!backup_of(&project).exists());
    assert!(!dir.path().join("app.vcxproj.filters").exists());
}

#[test]
fn missing_or_ambiguous_project_returns_quietly() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "a.cpp");
    assert_eq!(run(&options(dir.path())).unwrap(), Outcome::NoProject);

    fs::write(dir.path().join("one.vcxproj"), with_bom(PROJECT)).unwrap();
    fs::write(dir.path().join("two.VCXPROJ"), with_bom(PROJECT)).unwrap();
    assert_eq!(run(&options(dir.path())).unwrap(), Outcome::NoProject);
    assert!(!dir.path().join("one.vcxproj.bak").exists());

    let opts = SyncOptions {
        project: Some(dir.path().join("two.VCXPROJ")),
        ..SyncOptions::new(dir.path())
    };
    assert!(matches!(run(&opts).unwrap(), Outcome::Updated(_)));
    assert!(dir.path().join("two.VCXPROJ.bak").exists());
    assert!(dir.path().join("two.VCXPROJ.filters").exists());
    assert!(!dir.path().join("one.vcxproj.bak").exists());
}

#[test]
fn explicit_filter_path_is_used_when_it_exists() {
    let (dir, _) = sample_tree();
    let custom = dir.path().join("custom.filters");
    fs::write(&custom, "<Project>\n</Project>\n").unwrap();

    let opts = SyncOptions {
        filter: Some(custom.clone()),
        ..SyncOptions::new(dir.path())
    };
    run(&opts).unwrap();
    assert!(fs::read_to_string(&custom).unwrap().contains("<ClInclude Include=\"inc\\a.h\">"));
    assert!(!dir.path().join("app.vcxproj.filters").exists());
}

#[test]
fn top_level_debug_dir_is_skipped_but_nested_one_is_not() {
    let (dir, _) = sample_tree();
    touch(dir.path(), "Debug/generated.cpp");
    touch(dir.path(), "src/impl/Debug/trace.cpp");

    let source = |opts: &SyncOptions| match run(opts).unwrap() {
        Outcome::Scanned(diffs) => diffs
            .into_iter()
            .find(|d| d.category == Category::Source)
            .unwrap()
            .project_missing,
        other => panic!("unexpected outcome: {other:?}"),
    };

    assert_eq!(source(&scan_only(dir.path())), vec!["src\\impl\\Debug\\trace.cpp"]);

    let everywhere = SyncOptions {
        rules: ScanRules::new(&["docs", "debug", "release"], &["debug"], &[]),
        ..scan_only(dir.path())
    };
    assert!(source(&everywhere).is_empty());
}
