use std::fs;
use std::io::{self, Read, Write};

use anyhow::{bail, Context};
use colored::Colorize;
use txlog_state::{open_state_store, CommitState, StateStore};
use txlog_storage::{open_object_store, ObjectMeta, ObjectStore, Path};

use crate::cli::*;
use crate::config::CliConfig;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = CliConfig::resolve(&cli)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let format = cli.format;
    let store = || open_object_store(&config.store).context("opening object store");

    match cli.command {
        Command::Put(args) => cmd_put(store()?.as_ref(), args, &mut out),
        Command::Get(args) => cmd_get(store()?.as_ref(), args, &mut out),
        Command::Head(args) => cmd_head(store()?.as_ref(), args, &format, &mut out),
        Command::Ls(args) => cmd_ls(store()?.as_ref(), args, &format, &mut out),
        Command::Rm(args) => cmd_rm(store()?.as_ref(), args, &mut out),
        Command::Mv(args) => cmd_mv(store()?.as_ref(), args, &mut out),
        Command::State(args) => {
            let state = open_state_store(&config.state).context("opening state store")?;
            cmd_state(state.as_ref(), args.action, &format, &mut out)
        }
    }
}

fn cmd_put(store: &dyn ObjectStore, args: PutArgs, out: &mut dyn Write) -> anyhow::Result<()> {
    let data = match (&args.file, args.data) {
        (Some(file), _) => {
            fs::read(file).with_context(|| format!("reading {}", file.display()))?
        }
        (None, Some(data)) => data.into_bytes(),
        (None, None) => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf).context("reading stdin")?;
            buf
        }
    };
    let location = Path::new(&args.path);
    store
        .put(&location, &data)
        .with_context(|| format!("writing {location}"))?;
    writeln!(out, "{} Wrote {} ({} bytes)", "✓".green(), location.to_string().bold(), data.len())?;
    Ok(())
}

fn cmd_get(store: &dyn ObjectStore, args: PathArgs, out: &mut dyn Write) -> anyhow::Result<()> {
    let location = Path::new(&args.path);
    let data = store
        .get(&location)
        .with_context(|| format!("reading {location}"))?;
    out.write_all(&data)?;
    Ok(())
}

fn cmd_head(
    store: &dyn ObjectStore,
    args: PathArgs,
    format: &OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let location = Path::new(&args.path);
    // A directory is still worth describing.
    let meta = match store.head(&location) {
        Ok(meta) => meta,
        Err(e) => match e.dir_meta() {
            Some(meta) => meta.clone(),
            None => return Err(e).with_context(|| format!("inspecting {location}")),
        },
    };
    print_metas(&[meta], format, out)
}

fn cmd_ls(
    store: &dyn ObjectStore,
    args: LsArgs,
    format: &OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let prefix = Path::new(&args.prefix);
    let mut metas = store
        .list(&prefix)
        .with_context(|| format!("listing '{prefix}'"))?;
    metas.sort_by(|a, b| a.location.cmp(&b.location));
    print_metas(&metas, format, out)
}

fn cmd_rm(store: &dyn ObjectStore, args: PathArgs, out: &mut dyn Write) -> anyhow::Result<()> {
    let location = Path::new(&args.path);
    store
        .delete(&location)
        .with_context(|| format!("deleting {location}"))?;
    writeln!(out, "Deleted {}", location.to_string().bold())?;
    Ok(())
}

fn cmd_mv(store: &dyn ObjectStore, args: MvArgs, out: &mut dyn Write) -> anyhow::Result<()> {
    let from = Path::new(&args.from);
    let to = Path::new(&args.to);
    if !args.if_not_exists {
        store
            .rename(&from, &to)
            .with_context(|| format!("moving {from} to {to}"))?;
        writeln!(out, "Moved {} → {}", from.to_string().bold(), to.to_string().bold())?;
        return Ok(());
    }
    match store.rename_if_not_exists(&from, &to) {
        Ok(()) => {
            writeln!(out, "{} Claimed {} from {}", "✓".green(), to.to_string().bold(), from)?;
            Ok(())
        }
        Err(e) if e.is_version_conflict() => {
            bail!("{to} already exists; {from} was left in place")
        }
        Err(e) => Err(e).with_context(|| format!("moving {from} to {to}")),
    }
}

fn cmd_state(
    state: &dyn StateStore,
    action: StateAction,
    format: &OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    match action {
        StateAction::Get => match state.get() {
            Ok(current) => match format {
                OutputFormat::Json => writeln!(out, "{}", serde_json::to_string(&current)?)?,
                OutputFormat::Text => writeln!(out, "{}", current.version.to_string().yellow())?,
            },
            Err(e) if e.is_empty() => match format {
                OutputFormat::Json => writeln!(out, "null")?,
                OutputFormat::Text => writeln!(out, "{}", "no commit state recorded".dimmed())?,
            },
            Err(e) => return Err(e).context("reading commit state"),
        },
        StateAction::Put { version } => {
            state
                .put(CommitState::new(version))
                .context("writing commit state")?;
            writeln!(out, "{} Recorded version {}", "✓".green(), version.to_string().yellow())?;
        }
    }
    Ok(())
}

fn print_metas(metas: &[ObjectMeta], format: &OutputFormat, out: &mut dyn Write) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            writeln!(out, "{}", serde_json::to_string_pretty(metas)?)?;
        }
        OutputFormat::Text => {
            for meta in metas {
                let size = if meta.is_dir() {
                    "DIR".cyan().to_string()
                } else {
                    meta.size.to_string()
                };
                writeln!(
                    out,
                    "{:>10}  {}  {}",
                    size,
                    meta.last_modified.format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
                    meta.location
                )?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use txlog_state::InMemoryStateStore;
    use txlog_storage::InMemoryObjectStore;

    fn output(f: impl FnOnce(&mut dyn Write) -> anyhow::Result<()>) -> String {
        colored::control::set_override(false);
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn put_then_get() {
        let store = InMemoryObjectStore::new();
        let args = PutArgs { path: "a/b".into(), file: None, data: Some("hello".into()) };
        output(|out| cmd_put(&store, args, out));
        let got = output(|out| cmd_get(&store, PathArgs { path: "a/b".into() }, out));
        assert_eq!(got, "hello");
    }

    #[test]
    fn ls_json_is_sorted() {
        let store = InMemoryObjectStore::new();
        store.put(&Path::new("t/b"), b"1").unwrap();
        store.put(&Path::new("t/a"), b"22").unwrap();
        let json = output(|out| {
            cmd_ls(&store, LsArgs { prefix: "t/".into() }, &OutputFormat::Json, out)
        });
        let metas: Vec<ObjectMeta> = serde_json::from_str(&json).unwrap();
        let locs: Vec<&str> = metas.iter().map(|m| m.location.as_str()).collect();
        assert_eq!(locs, vec!["t/", "t/a", "t/b"]);
    }

    #[test]
    fn head_describes_directories() {
        let store = InMemoryObjectStore::new();
        store.put(&Path::new("d/x"), b"1").unwrap();
        let text = output(|out| {
            cmd_head(&store, PathArgs { path: "d".into() }, &OutputFormat::Text, out)
        });
        assert!(text.contains("DIR"));
        assert!(text.trim_end().ends_with("d/"));
    }

    #[test]
    fn conditional_move_conflict_is_an_error() {
        let store = InMemoryObjectStore::new();
        store.put(&Path::new("slot"), b"1").unwrap();
        store.put(&Path::new("staging"), b"2").unwrap();
        let args = MvArgs { from: "staging".into(), to: "slot".into(), if_not_exists: true };
        let err = cmd_mv(&store, args, &mut Vec::new()).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert!(store.exists(&Path::new("staging")).unwrap());
    }

    #[test]
    fn state_get_and_put() {
        let state = InMemoryStateStore::new();
        let empty = output(|out| cmd_state(&state, StateAction::Get, &OutputFormat::Json, out));
        assert_eq!(empty.trim(), "null");

        output(|out| cmd_state(&state, StateAction::Put { version: 5 }, &OutputFormat::Text, out));
        let json = output(|out| cmd_state(&state, StateAction::Get, &OutputFormat::Json, out));
        assert_eq!(json.trim(), r#"{"version":5}"#);
    }
}
