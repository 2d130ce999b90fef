//! Encoder command construction.
//!
//! Turns one input file plus the batch settings into the exact argument list
//! handed to the encoder, and derives the output path next to the input.
//! Nothing here touches the file system or spawns processes.

use crate::config::{
    DEFAULT_ENCODER_PROGRAM, OUTPUT_EXTENSION, OUTPUT_SUFFIX, PIXEL_FORMAT, PRORES_CODEC, Profile,
};
use crate::error::{CoreError, CoreResult};
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};

/// A fully resolved encoder invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeCommand {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub output_path: PathBuf,
}

impl EncodeCommand {
    /// Arguments as strings, lossily converted.
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }

    /// Shell-quoted command line suitable for logs and copy-paste.
    pub fn display(&self) -> String {
        let parts = std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(OsString::as_os_str));
        shell_join(parts)
    }
}

impl fmt::Display for EncodeCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// Builder for [`EncodeCommand`] with the converter's defaults.
#[derive(Debug, Clone)]
pub struct EncodeCommandBuilder {
    input: PathBuf,
    program: PathBuf,
    profile: Profile,
    threads: usize,
    overwrite: bool,
}

impl EncodeCommandBuilder {
    #[must_use]
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            program: PathBuf::from(DEFAULT_ENCODER_PROGRAM),
            profile: Profile::default(),
            threads: 1,
            overwrite: false,
        }
    }

    #[must_use]
    pub fn program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    #[must_use]
    pub fn profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    /// Encoder thread count. Values below 1 are raised to 1.
    #[must_use]
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    #[must_use]
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn build(self) -> CoreResult<EncodeCommand> {
        let output_path = output_path_for(&self.input)?;

        let mut args: Vec<OsString> = Vec::with_capacity(16);
        // -n: an existing output fails the job rather than prompting.
        args.push(if self.overwrite { "-y" } else { "-n" }.into());
        args.push("-i".into());
        args.push(self.input.into_os_string());
        args.push("-c:v".into());
        args.push(PRORES_CODEC.into());
        args.push("-profile:v".into());
        args.push(self.profile.index().to_string().into());
        args.push("-pix_fmt".into());
        args.push(PIXEL_FORMAT.into());
        args.push("-threads".into());
        args.push(self.threads.to_string().into());
        args.push("-c:a".into());
        args.push("copy".into());
        args.push(output_path.clone().into_os_string());

        Ok(EncodeCommand {
            program: self.program,
            args,
            output_path,
        })
    }
}

/// Builds the default encoder command for one input.
pub fn build_command(input: &Path, profile: Profile, threads: usize) -> CoreResult<EncodeCommand> {
    EncodeCommandBuilder::new(input)
        .profile(profile)
        .threads(threads)
        .build()
}

/// `<dir>/<stem>_prores.mov` for the given input.
pub fn output_path_for(input: &Path) -> CoreResult<PathBuf> {
    let stem = input
        .file_stem()
        .filter(|stem| !stem.is_empty())
        .ok_or_else(|| {
            CoreError::PathError(format!(
                "Cannot derive an output name from '{}'",
                input.display()
            ))
        })?;

    let mut file_name = stem.to_os_string();
    file_name.push(OUTPUT_SUFFIX);
    file_name.push(".");
    file_name.push(OUTPUT_EXTENSION);

    Ok(match input.parent() {
        Some(parent) => parent.join(file_name),
        None => PathBuf::from(file_name),
    })
}

/// Quotes `value` for a POSIX shell. Values made only of safe characters
/// are returned unchanged.
pub fn shell_quote(value: &str) -> String {
    if value.is_empty() {
        return "''".to_string();
    }

    let is_safe = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "@%+=:,./_-".contains(c));
    if is_safe {
        return value.to_string();
    }

    format!("'{}'", value.replace('\'', r#"'"'"'"#))
}

/// Quotes every part and joins them with spaces.
pub fn shell_join<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    parts
        .into_iter()
        .map(|part| shell_quote(&part.as_ref().to_string_lossy()))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value_after(args: &[String], flag: &str) -> Option<String> {
        args.iter()
            .position(|arg| arg == flag)
            .and_then(|i| args.get(i + 1))
            .cloned()
    }

    #[test]
    fn test_standard_multithread_scenario() {
        let cmd = build_command(Path::new("/videos/clip.mp4"), Profile::Standard, 8).unwrap();
        let args = cmd.args_lossy();

        assert_eq!(cmd.program, PathBuf::from("ffmpeg"));
        assert_eq!(value_after(&args, "-i").as_deref(), Some("/videos/clip.mp4"));
        assert_eq!(value_after(&args, "-c:v").as_deref(), Some("prores_ks"));
        assert_eq!(value_after(&args, "-profile:v").as_deref(), Some("2"));
        assert_eq!(value_after(&args, "-threads").as_deref(), Some("8"));
        assert_eq!(value_after(&args, "-pix_fmt").as_deref(), Some("yuv422p10le"));
        assert_eq!(value_after(&args, "-c:a").as_deref(), Some("copy"));
        assert_eq!(args.last().map(String::as_str), Some("/videos/clip_prores.mov"));
        assert_eq!(cmd.output_path, PathBuf::from("/videos/clip_prores.mov"));
    }

    #[test]
    fn test_argument_order() {
        let cmd = build_command(Path::new("/a/b.mkv"), Profile::Hq, 1).unwrap();
        assert_eq!(
            cmd.args_lossy(),
            vec![
                "-n", "-i", "/a/b.mkv", "-c:v", "prores_ks", "-profile:v", "3", "-pix_fmt",
                "yuv422p10le", "-threads", "1", "-c:a", "copy", "/a/b_prores.mov",
            ]
        );
    }

    #[test]
    fn test_single_thread_still_emits_threads_flag() {
        let cmd = build_command(Path::new("in.mov"), Profile::Proxy, 1).unwrap();
        let args = cmd.args_lossy();
        assert_eq!(value_after(&args, "-threads").as_deref(), Some("1"));
        assert_eq!(value_after(&args, "-profile:v").as_deref(), Some("0"));
    }

    #[test]
    fn test_zero_threads_is_raised_to_one() {
        let cmd = build_command(Path::new("in.mov"), Profile::Lt, 0).unwrap();
        assert_eq!(value_after(&cmd.args_lossy(), "-threads").as_deref(), Some("1"));
    }

    #[test]
    fn test_overwrite_and_program_override() {
        let cmd = EncodeCommandBuilder::new("/tmp/x.mp4")
            .program("/opt/ffmpeg/bin/ffmpeg")
            .overwrite(true)
            .build()
            .unwrap();
        assert_eq!(cmd.program, PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
        assert_eq!(cmd.args_lossy()[0], "-y");
    }

    #[test]
    fn test_output_path_never_equals_input() {
        for input in ["/v/clip.mov", "/v/clip_prores.mov", "clip", "/v/.hidden", "/v/a.b.c"] {
            let input = Path::new(input);
            let output = output_path_for(input).unwrap();
            assert_ne!(output, input);
            assert_eq!(output.parent(), input.parent());
        }
    }

    #[test]
    fn test_output_path_keeps_inner_dots() {
        assert_eq!(
            output_path_for(Path::new("/v/a.b.c")).unwrap(),
            PathBuf::from("/v/a.b_prores.mov")
        );
        assert_eq!(
            output_path_for(Path::new("/v/My Clip.MP4")).unwrap(),
            PathBuf::from("/v/My Clip_prores.mov")
        );
    }

    #[test]
    fn test_output_path_requires_file_name() {
        assert!(matches!(output_path_for(Path::new("/")), Err(CoreError::PathError(_))));
        assert!(output_path_for(Path::new("")).is_err());
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("prores_ks"), "prores_ks");
        assert_eq!(shell_quote("/videos/clip.mp4"), "/videos/clip.mp4");
        assert_eq!(shell_quote("My Clip.mp4"), "'My Clip.mp4'");
        assert_eq!(shell_quote("it's"), r#"'it'"'"'s'"#);
        assert_eq!(shell_quote(""), "''");
        assert_eq!(shell_join(["a b", "c"]), "'a b' c");
    }

    #[test]
    fn test_display_quotes_paths_with_spaces() {
        let cmd = build_command(Path::new("/my videos/clip one.mp4"), Profile::Standard, 4).unwrap();
        let shown = cmd.display();
        assert!(shown.starts_with("ffmpeg -n -i '/my videos/clip one.mp4' -c:v prores_ks"));
        assert!(shown.ends_with("'/my videos/clip one_prores.mov'"));
        assert_eq!(cmd.to_string(), shown);
    }
}
