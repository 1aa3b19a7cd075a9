use hound::{SampleFormat, WavSpec, WavWriter};
use std::error::Error;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

fn bitify_command() -> Command {
    Command::new(env!("CARGO_BIN_EXE_bitify"))
}

fn run(args: &[&str]) -> Result<Output, Box<dyn Error>> {
    Ok(bitify_command().args(args).output()?)
}

fn write_cover(path: &Path, frames: usize) -> Result<(), Box<dyn Error>> {
    let spec = WavSpec {
        channels: 2,
        sample_rate: 44_100,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)?;
    for i in 0..frames * 2 {
        writer.write_sample(((i * 7_919) % 16_000) as i16 - 8_000)?;
    }
    writer.finalize()?;
    Ok(())
}

#[test]
fn cli_end_to_end_flow() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let cover = dir.path().join("cover.wav");
    let secret = dir.path().join("secret.txt");
    let out_dir = dir.path().join("recovered");
    write_cover(&cover, 20_000)?;
    fs::write(&secret, b"Super secret payload for Bitify!")?;

    let embed = run(&[
        "embed",
        "--password",
        "passphrase",
        "--encrypt",
        "--placement",
        "scatter",
        "--lsb",
        "3",
        cover.to_str().unwrap(),
        secret.to_str().unwrap(),
    ])?;
    assert!(
        embed.status.success(),
        "embed command failed: {}",
        String::from_utf8_lossy(&embed.stderr)
    );
    assert!(String::from_utf8(embed.stdout)?.contains("Embedded secret.txt"));

    let stego = dir.path().join("cover.stego.wav");
    assert!(stego.exists(), "default output should sit next to the cover");

    let extract = run(&[
        "extract",
        "--password",
        "passphrase",
        stego.to_str().unwrap(),
        out_dir.to_str().unwrap(),
    ])?;
    assert!(
        extract.status.success(),
        "extract command failed: {}",
        String::from_utf8_lossy(&extract.stderr)
    );
    assert_eq!(
        fs::read(out_dir.join("secret.txt"))?,
        b"Super secret payload for Bitify!"
    );

    let psnr = run(&["psnr", cover.to_str().unwrap(), stego.to_str().unwrap()])?;
    assert!(psnr.status.success());
    assert!(String::from_utf8(psnr.stdout)?.contains("dB"));
    Ok(())
}

#[test]
fn wrong_password_fails_with_error() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let cover = dir.path().join("cover.wav");
    let secret = dir.path().join("s.bin");
    let stego = dir.path().join("stego.wav");
    write_cover(&cover, 20_000)?;
    fs::write(&secret, [1u8, 2, 3, 4])?;

    let embed = run(&[
        "embed",
        "--password",
        "right",
        "--encrypt",
        cover.to_str().unwrap(),
        secret.to_str().unwrap(),
        stego.to_str().unwrap(),
    ])?;
    assert!(embed.status.success());

    let extract = run(&[
        "extract",
        "--password",
        "wrong",
        stego.to_str().unwrap(),
        dir.path().to_str().unwrap(),
    ])?;
    assert!(!extract.status.success());
    let stderr = String::from_utf8(extract.stderr)?;
    assert!(stderr.starts_with("Error: Authentication failed"), "{}", stderr);
    Ok(())
}

#[test]
fn json_reports_use_api_field_names() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let cover = dir.path().join("cover.wav");
    let secret = dir.path().join("notes.txt");
    let stego = dir.path().join("stego.wav");
    write_cover(&cover, 10_000)?;
    fs::write(&secret, b"json please")?;

    let embed = run(&[
        "embed",
        "--json",
        cover.to_str().unwrap(),
        secret.to_str().unwrap(),
        stego.to_str().unwrap(),
    ])?;
    assert!(embed.status.success());
    let report: serde_json::Value = serde_json::from_slice(&embed.stdout)?;
    assert_eq!(report["originalFileName"], "notes.txt");
    assert_eq!(report["fileSizeBytes"], 11);
    assert!(report["psnr"].as_f64().is_some());

    let extract = run(&[
        "extract",
        "--json",
        stego.to_str().unwrap(),
        dir.path().join("out").to_str().unwrap(),
    ])?;
    assert!(extract.status.success());
    let report: serde_json::Value = serde_json::from_slice(&extract.stdout)?;
    assert_eq!(report["fileType"], "text/plain");
    assert_eq!(report["sha256"].as_str().map(str::len), Some(64));
    Ok(())
}

#[test]
fn capacity_command_lists_depths() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let cover = dir.path().join("cover.wav");
    write_cover(&cover, 10_000)?;

    let all = run(&["capacity", cover.to_str().unwrap()])?;
    assert!(all.status.success());
    let stdout = String::from_utf8(all.stdout)?;
    assert!(stdout.contains("depth 1"));
    assert!(stdout.contains("depth 8"));

    // 10000 frames * 2 channels * 2 bits / 8 - 263
    let one = run(&["capacity", "--lsb", "2", "--json", cover.to_str().unwrap()])?;
    let report: serde_json::Value = serde_json::from_slice(&one.stdout)?;
    assert_eq!(report["capacities"][0]["capacityBytes"], 4_737);
    Ok(())
}

#[test]
fn oversized_secret_reports_capacity_error() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let cover = dir.path().join("cover.wav");
    let secret = dir.path().join("big.bin");
    let stego = dir.path().join("stego.wav");
    write_cover(&cover, 1_000)?;
    fs::write(&secret, vec![0u8; 10_000])?;

    let embed = run(&[
        "embed",
        cover.to_str().unwrap(),
        secret.to_str().unwrap(),
        stego.to_str().unwrap(),
    ])?;
    assert!(!embed.status.success());
    assert!(String::from_utf8(embed.stderr)?.contains("Capacity exceeded"));
    assert!(!stego.exists());
    Ok(())
}

#[test]
fn unknown_placement_is_rejected() -> Result<(), Box<dyn Error>> {
    let output = run(&["embed", "--placement", "zigzag", "a.wav", "b.txt"])?;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("zigzag"));
    Ok(())
}

#[test]
fn version_flag_prints_build_information() -> Result<(), Box<dyn Error>> {
    let output = run(&["--version"])?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.starts_with("bitify "), "unexpected version line: {}", stdout);
    assert!(stdout.contains("build"));
    Ok(())
}

#[test]
fn running_without_subcommand_displays_help() -> Result<(), Box<dyn Error>> {
    let output = bitify_command().output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("Usage: bitify"));
    assert!(stdout.contains("Commands:"));
    Ok(())
}
