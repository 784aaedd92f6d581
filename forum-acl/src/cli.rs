//! Command line interface for inspecting forum privileges.
//!
//! Works on a JSON snapshot of the portal's forums, groups, users and
//! privilege records (see [`crate::permissions::Snapshot`]).

use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::config::Config;
use crate::permissions::{
    export_group_permissions, split_negative_positive, ForumId, ForumPrivileges, MemoryCache,
    MemoryStore, NoCache, PrivilegeCache, PrivilegeResolver, TopicId, User, UserId,
};

/// Forum ACL inspection tool
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Snapshot file, overrides `ACL_SNAPSHOT_PATH`
    #[arg(short, long, global = true)]
    pub snapshot: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the effective privileges of a user as JSON
    Resolve {
        /// User id, or "anonymous"
        #[arg(short, long)]
        user: UserSelector,
        /// Forum ids to resolve (default: all forums)
        #[arg(short, long = "forum")]
        forums: Vec<ForumId>,
    },
    /// Check a single privilege on a forum or on the forum of a topic
    Check {
        /// User id, or "anonymous"
        #[arg(short, long)]
        user: UserSelector,
        /// Forum id
        #[arg(short, long, conflicts_with = "topic", required_unless_present = "topic")]
        forum: Option<ForumId>,
        /// Topic id
        #[arg(short, long)]
        topic: Option<TopicId>,
        /// Privilege name, e.g. "read" or "create_poll"
        #[arg(short, long, default_value = "read")]
        privilege: String,
    },
    /// Export the group grants of every forum as JSON
    Export {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Split a comma-separated list like "-2,-8,8" into negative and positive masks
    Split {
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
}

/// Which user to resolve for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserSelector {
    Anonymous,
    Id(UserId),
}

impl FromStr for UserSelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("anonymous") {
            return Ok(Self::Anonymous);
        }
        s.parse()
            .map(Self::Id)
            .map_err(|_| format!("expected a user id or \"anonymous\", got {s:?}"))
    }
}

/// One forum in the `resolve` output.
#[derive(Debug, Serialize)]
struct ResolvedForum {
    mask: u32,
    privileges: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
struct SplitOutput {
    negative: u32,
    positive: u32,
}

fn lookup_user(store: &MemoryStore, selector: UserSelector) -> Result<User> {
    match selector {
        UserSelector::Anonymous => Ok(User::Anonymous),
        UserSelector::Id(id) => store
            .member(id)
            .cloned()
            .map(User::from)
            .with_context(|| format!("unknown user {id}")),
    }
}

fn load_store(cli: &Cli, config: &Config) -> Result<MemoryStore> {
    let path = match &cli.snapshot {
        Some(path) => path,
        None => config.require_snapshot_path()?,
    };
    MemoryStore::load(path).with_context(|| format!("loading snapshot {}", path.display()))
}

/// Execute `cli`, writing results to `out`.
pub fn run(cli: &Cli, config: &Config, out: &mut impl Write) -> Result<()> {
    if let Commands::Split { value } = &cli.command {
        let (negative, positive) = split_negative_positive(value);
        serde_json::to_writer(&mut *out, &SplitOutput { negative, positive })?;
        writeln!(out)?;
        return Ok(());
    }

    let store = load_store(cli, config)?;
    let cache: Box<dyn PrivilegeCache> = if config.cache_enabled {
        Box::new(MemoryCache::new())
    } else {
        Box::new(NoCache)
    };
    let resolver = PrivilegeResolver::new(&store, config.default_groups(), cache.as_ref())
        .with_prefix(config.cache_prefix.clone());

    match &cli.command {
        Commands::Resolve { user, forums } => {
            let user = lookup_user(&store, *user)?;
            let map = if forums.is_empty() {
                resolver.get_privileges(&user, store.forums())
            } else {
                resolver.get_privileges(&user, forums)
            }?;

            let resolved: BTreeMap<ForumId, ResolvedForum> = map
                .into_iter()
                .map(|(id, mask)| {
                    let entry = ResolvedForum {
                        mask: mask.bits(),
                        privileges: mask.privilege_names().collect(),
                    };
                    (id, entry)
                })
                .collect();
            serde_json::to_writer_pretty(&mut *out, &resolved)?;
            writeln!(out)?;
        }
        Commands::Check {
            user,
            forum,
            topic,
            privilege,
        } => {
            let user = lookup_user(&store, *user)?;
            let Some(wanted) = ForumPrivileges::by_name(privilege) else {
                bail!("unknown privilege {privilege:?}");
            };
            let allowed = match (forum, topic) {
                (_, Some(topic_id)) => {
                    let topic = store
                        .topic(*topic_id)
                        .with_context(|| format!("unknown topic {topic_id}"))?;
                    resolver.have_privilege(&user, topic, wanted)?
                }
                (Some(forum_id), None) => resolver.have_privilege(&user, forum_id, wanted)?,
                (None, None) => bail!("either --forum or --topic is required"),
            };
            tracing::info!(?user, privilege = %privilege, allowed, "Checked privilege");
            writeln!(out, "{allowed}")?;
        }
        Commands::Export { output } => {
            let export = export_group_permissions(&store);
            match output {
                Some(path) => {
                    let file = std::fs::File::create(path)
                        .with_context(|| format!("creating {}", path.display()))?;
                    serde_json::to_writer_pretty(file, &export)?;
                    tracing::info!(path = %path.display(), forums = export.len(), "Exported group permissions");
                }
                None => {
                    serde_json::to_writer_pretty(&mut *out, &export)?;
                    writeln!(out)?;
                }
            }
        }
        Commands::Split { .. } => {}
    }

    Ok(())
}
