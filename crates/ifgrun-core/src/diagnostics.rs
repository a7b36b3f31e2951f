//! Container diagnostics echoed to stdout for the batch log system.

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::Path;

/// Variables whose name starts with `prefix`, in the order given.
pub fn batch_params<I>(vars: I, prefix: &str) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter()
        .filter_map(|(k, v)| {
            let k = k.to_string_lossy().into_owned();
            k.starts_with(prefix)
                .then(|| (k, v.to_string_lossy().into_owned()))
        })
        .collect()
}

/// Writes the `CWD:` line (`unknown` when `cwd` is `None`) followed by one line per variable.
pub fn write_batch_params<W: Write>(
    out: &mut W,
    cwd: Option<&Path>,
    params: &[(String, String)],
) -> io::Result<()> {
    match cwd {
        Some(cwd) => writeln!(out, "CWD:  {}", cwd.display())?,
        None => writeln!(out, "CWD:  unknown")?,
    }
    for (k, v) in params {
        writeln!(out, "{} {}", k, v)?;
    }
    out.flush()
}

/// Write the working directory and every `prefix*` environment variable to `out`.
/// Failures are logged and otherwise ignored.
pub fn emit_batch_params<W: Write>(out: &mut W, prefix: &str) {
    let cwd = std::env::current_dir()
        .map_err(|e| tracing::warn!("cannot read current directory: {}", e))
        .ok();
    let params = batch_params(std::env::vars_os(), prefix);
    tracing::debug!(count = params.len(), prefix, "batch environment");
    if let Err(e) = write_batch_params(out, cwd.as_deref(), &params) {
        tracing::warn!("cannot write diagnostics: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(OsString, OsString)> {
        pairs
            .iter()
            .map(|(k, v)| (OsString::from(k), OsString::from(v)))
            .collect()
    }

    #[test]
    fn filters_by_prefix_and_keeps_order() {
        let env = vars(&[
            ("AWS_BATCH_JOB_ID", "abc"),
            ("HOME", "/root"),
            ("AWS_BATCH_CE_NAME", "spot"),
            ("AWS_REGION", "us-west-2"),
        ]);
        let params = batch_params(env, "AWS_BATCH");
        assert_eq!(
            params,
            vec![
                ("AWS_BATCH_JOB_ID".to_string(), "abc".to_string()),
                ("AWS_BATCH_CE_NAME".to_string(), "spot".to_string()),
            ]
        );
    }

    #[test]
    fn no_matching_vars() {
        let env = vars(&[("PATH", "/usr/bin")]);
        assert!(batch_params(env, "AWS_BATCH").is_empty());
    }

    #[test]
    fn writes_cwd_then_params() {
        let mut out = Vec::new();
        let params = vec![("AWS_BATCH_JOB_ID".to_string(), "abc".to_string())];
        write_batch_params(&mut out, Some(Path::new("/work")), &params).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "CWD:  /work\nAWS_BATCH_JOB_ID abc\n");
    }

    #[test]
    fn unknown_cwd_still_lists_params() {
        let mut out = Vec::new();
        let params = vec![
            ("AWS_BATCH_JOB_ID".to_string(), "abc".to_string()),
            ("AWS_BATCH_JQ_NAME".to_string(), "spot-queue".to_string()),
        ];
        write_batch_params(&mut out, None, &params).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "CWD:  unknown\nAWS_BATCH_JOB_ID abc\nAWS_BATCH_JQ_NAME spot-queue\n"
        );
    }
}
