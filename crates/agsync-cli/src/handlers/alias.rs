use crate::args::AliasCommand;
use crate::presentation::ConsoleRenderer;
use crate::presentation::view_models::{
    AliasChangeViewModel, AliasListViewModel, AliasViewModel, ChangeKind, MemberViewModel,
};
use agsync_runtime::{AgSync, AliasDocument, AliasMember};
use agsync_types::Source;
use anyhow::{Context, Result, anyhow};

fn members(list: &[AliasMember]) -> Vec<MemberViewModel> {
    list.iter()
        .map(|m| MemberViewModel {
            source: m.source.key(),
            pattern: m.pattern.clone(),
        })
        .collect()
}

fn change(change: ChangeKind, name: &str, list: &[AliasMember]) -> AliasChangeViewModel {
    AliasChangeViewModel {
        change,
        aliases: vec![name.to_string()],
        members: members(list),
    }
}

pub fn handle(app: &mut AgSync, command: AliasCommand, renderer: &ConsoleRenderer) -> Result<()> {
    let registry = app.registry_mut();

    match command {
        AliasCommand::Create { name } => {
            let name = name.trim_start_matches('@');
            registry.create(name)?;
            renderer.render(&change(ChangeKind::Created, name, &[]))
        }
        AliasCommand::Delete { name } => {
            let name = name.trim_start_matches('@');
            let removed = registry.delete(name)?;
            renderer.render(&change(ChangeKind::Deleted, &removed.name, &[]))
        }
        AliasCommand::Add {
            name,
            patterns,
            source,
            remote,
        } => {
            let name = name.trim_start_matches('@');
            let source = match remote {
                Some(host) => Source::remote(host),
                None => source.parse::<Source>()?,
            };
            let added = registry.add_members(name, &source, &patterns)?;
            renderer.render(&change(ChangeKind::Added, name, &added))
        }
        AliasCommand::Remove { name, member } => {
            let name = name.trim_start_matches('@');
            let removed = registry.remove_member(name, &member)?;
            renderer.render(&change(ChangeKind::Removed, name, &removed))
        }
        AliasCommand::List => renderer.render(&AliasListViewModel {
            aliases: registry.list().map(AliasViewModel::from).collect(),
        }),
        AliasCommand::Show { name } => {
            let name = name.trim_start_matches('@');
            let alias = registry
                .get(name)
                .ok_or_else(|| anyhow!("Alias '{}' not found", name))?;
            renderer.render(&AliasListViewModel {
                aliases: vec![AliasViewModel::from(alias)],
            })
        }
        AliasCommand::Export { output } => {
            let json = serde_json::to_string_pretty(&registry.export())?;
            match output {
                Some(path) => std::fs::write(&path, json + "\n")
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => println!("{}", json),
            }
            Ok(())
        }
        AliasCommand::Import { file, force } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let document: AliasDocument = serde_json::from_str(&content)
                .with_context(|| format!("Invalid alias file {}", file.display()))?;
            let imported = registry.import(document, force)?;
            renderer.render(&AliasChangeViewModel {
                change: ChangeKind::Imported,
                aliases: imported,
                members: Vec::new(),
            })
        }
    }
}
