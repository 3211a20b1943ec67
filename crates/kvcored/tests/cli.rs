use std::io::Write as _;
use std::process::Command;

fn kvcored() -> Command {
    Command::new(env!("CARGO_BIN_EXE_kvcored"))
}

fn write_config(dir: &std::path::Path, data_dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("kvcored.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "data_dir = {:?}", data_dir.to_str().unwrap()).unwrap();
    path
}

#[test]
fn recover_reports_an_empty_store_on_a_fresh_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("data");
    let config_path = write_config(dir.path(), &data_dir);

    let output = kvcored().args(["--config", config_path.to_str().unwrap(), "recover"]).output().unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("key_count=0"), "stdout: {stdout}");
}

#[test]
fn stats_reflects_state_recovered_from_a_prior_run() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("data");
    let config_path = write_config(dir.path(), &data_dir);

    // Populate the store directly through the library, bypassing the
    // CLI's own write path (which `serve` would otherwise need a live
    // connection for).
    {
        let fs = kvcore_vfs::StdFilesystem;
        let engine_config =
            kvcore_engine::EngineConfig { data_dir: data_dir.clone(), ..kvcore_engine::EngineConfig::default() };
        let engine = kvcore_engine::Engine::open(fs, engine_config).unwrap();
        engine.put(b"a", b"1").unwrap();
        engine.close().unwrap();
    }

    let output = kvcored().args(["--config", config_path.to_str().unwrap(), "stats"]).output().unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("key_count=1"), "stdout: {stdout}");
}

#[test]
fn a_missing_config_file_falls_back_to_defaults_rather_than_erroring() {
    let dir = tempfile::tempdir().unwrap();
    let output = kvcored()
        .args(["--config", dir.path().join("does-not-exist.toml").to_str().unwrap(), "recover"])
        .current_dir(dir.path())
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
}
