// Wed Jan 15 2026 - Alex

use super::args::{parse_mapping, Args, Command, FindArgs, MangledArgs, StatsArgs, StoresArgs};
use crate::config::FinderConfig;
use crate::filter::{
    by_display_name, by_keys, by_prototype_keys, by_source, by_store_name, by_strings, combine, FilterRef,
};
use crate::finder::ModuleFinder;
use crate::module::{load_snapshot, value_to_json, ObjectFlags};
use crate::search::{Binding, Query, SearchOptions};
use crate::utils::{scoped_timer, LoggingUtils};
use anyhow::Context;
use colored::Colorize;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;

pub struct CommandHandler {
    json: bool,
}

impl CommandHandler {
    pub fn new() -> Self {
        Self { json: false }
    }

    pub fn execute(mut self, args: Args) -> anyhow::Result<()> {
        let level = LoggingUtils::level_from_str(&args.log_level);
        if std::env::var_os("RUST_LOG").is_some() {
            LoggingUtils::init_env_logger(level);
        } else {
            LoggingUtils::init_logger(level, !args.no_color);
        }
        if args.no_color {
            colored::control::set_override(false);
        }
        self.json = args.json;

        let config = match &args.config {
            Some(path) => FinderConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => FinderConfig::default(),
        };

        match args.command {
            Command::Stats(stats_args) => self.handle_stats(stats_args, config),
            Command::Find(find_args) => self.handle_find(find_args, config),
            Command::Mangled(mangled_args) => self.handle_mangled(mangled_args, config),
            Command::Stores(stores_args) => self.handle_stores(stores_args, config),
        }
    }

    fn open(&self, table: &Path, config: FinderConfig) -> anyhow::Result<ModuleFinder> {
        let _timer = scoped_timer("load module table");
        let cache = load_snapshot(table)
            .with_context(|| format!("Failed to load module table {}", table.display()))?;
        Ok(ModuleFinder::with_config(Arc::new(cache), config)?)
    }

    fn handle_stats(&self, args: StatsArgs, config: FinderConfig) -> anyhow::Result<()> {
        let finder = self.open(&args.table, config)?;
        let modules = finder.table().modules();

        let mut placeholders = 0;
        let mut skipped = 0;
        let mut with_default = 0;
        let mut function_exports = 0;
        for module in &modules {
            let exports = module.exports();
            if let Some(object) = exports.as_object() {
                if object.flags().contains(ObjectFlags::PLACEHOLDER) {
                    placeholders += 1;
                }
            }
            if finder.search().should_skip(exports) {
                skipped += 1;
                continue;
            }
            if finder.search().default_key(exports).is_some() {
                with_default += 1;
            }
            function_exports += exports.own_values().iter().filter(|v| v.is_function()).count();
        }

        if self.json {
            let report = json!({
                "modules": modules.len(),
                "skipped": skipped,
                "placeholders": placeholders,
                "with_default_key": with_default,
                "function_exports": function_exports,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        println!("{} Modules: {}", "[+]".green(), modules.len());
        println!("{} Skipped: {} ({} placeholders)", "[*]".blue(), skipped, placeholders);
        println!("{} With default key: {}", "[*]".blue(), with_default);
        println!("{} Function exports: {}", "[*]".blue(), function_exports);
        Ok(())
    }

    fn handle_find(&self, args: FindArgs, config: FinderConfig) -> anyhow::Result<()> {
        args.validate().map_err(|e| anyhow::anyhow!(e))?;
        let finder = self.open(&args.table, config)?;
        let filter = build_filter(&args);

        let options = SearchOptions::new()
            .all(args.all)
            .search_exports(!args.default_key_only)
            .default_export(!args.no_default_export);

        // Same filter projected both ways in one pass: values and their modules.
        let results = finder.get_bulk(&[
            Query::new(filter.clone()).with_options(options.raw(false)),
            Query::new(filter).with_options(options.raw(true)),
        ]);
        let mut results = results.into_iter();
        let values = results.next().flatten().map(|m| m.into_vec()).unwrap_or_default();
        let modules = results.next().flatten().map(|m| m.into_vec()).unwrap_or_default();

        let hits: Vec<_> = values
            .iter()
            .zip(&modules)
            .map(|(value, module)| {
                let id = module.module_id().map(|id| id.to_string()).unwrap_or_default();
                (id, value_to_json(value.value(), args.depth))
            })
            .collect();

        if self.json {
            let report: Vec<_> = hits.iter().map(|(id, value)| json!({"module": id, "value": value})).collect();
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        if hits.is_empty() {
            println!("{} No module matched", "[!]".yellow());
            return Ok(());
        }
        for (id, value) in &hits {
            println!("{} module {}: {}", "[+]".green(), id.bold(), value);
        }
        Ok(())
    }

    fn handle_mangled(&self, args: MangledArgs, config: FinderConfig) -> anyhow::Result<()> {
        args.validate().map_err(|e| anyhow::anyhow!(e))?;
        let finder = self.open(&args.table, config)?;

        let mut mappers: Vec<(String, FilterRef)> = Vec::new();
        for raw in &args.mappings {
            let (name, needles) = parse_mapping(raw).map_err(|e| anyhow::anyhow!(e))?;
            let needles: Vec<&str> = needles.iter().map(String::as_str).collect();
            mappers.push((name, by_strings(&needles)));
        }

        let mapping = match &args.locator {
            Some(locator) => finder.get_mangled(locator.as_str(), mappers, SearchOptions::default()),
            None => {
                let keys: Vec<&str> = args.locator_keys.iter().map(String::as_str).collect();
                finder.get_mangled(by_keys(&keys), mappers, SearchOptions::default())
            }
        };

        if self.json {
            let report: serde_json::Map<String, serde_json::Value> = mapping
                .bindings()
                .map(|(name, binding)| {
                    let key = match binding {
                        Binding::Bound(key) => json!(key),
                        Binding::Absent => serde_json::Value::Null,
                    };
                    (name.to_string(), key)
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        if mapping.target().is_none() {
            println!("{} Locator matched no module", "[!]".yellow());
        }
        for (name, binding) in mapping.bindings() {
            match binding {
                Binding::Bound(key) => println!("{} {} -> {}", "[+]".green(), name.bold(), key),
                Binding::Absent => println!("{} {} -> {}", "[-]".red(), name.bold(), "<absent>".dimmed()),
            }
        }
        Ok(())
    }

    fn handle_stores(&self, args: StoresArgs, config: FinderConfig) -> anyhow::Result<()> {
        let finder = self.open(&args.table, config)?;

        if let Some(name) = &args.name {
            let store = finder.get_store(name);
            let rendered = store
                .as_ref()
                .map(|s| value_to_json(s, args.depth))
                .unwrap_or(serde_json::Value::Null);
            if self.json {
                println!("{}", serde_json::to_string_pretty(&rendered)?);
            } else if store.is_some() {
                println!("{} {}: {}", "[+]".green(), name.bold(), rendered);
            } else {
                println!("{} Store not found: {}", "[!]".yellow(), name);
            }
            return Ok(());
        }

        let names = finder.stores().names();
        if self.json {
            println!("{}", serde_json::to_string_pretty(&names)?);
            return Ok(());
        }
        if !finder.stores().is_initialized() {
            println!("{} Store facility not found", "[!]".yellow());
        }
        for name in &names {
            println!("  {}", name);
        }
        println!("{} {} stores", "[+]".green(), names.len());
        Ok(())
    }
}

impl Default for CommandHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn build_filter(args: &FindArgs) -> FilterRef {
    fn as_strs(items: &[String]) -> Vec<&str> {
        items.iter().map(String::as_str).collect()
    }

    let mut filters = Vec::new();
    if !args.keys.is_empty() {
        filters.push(by_keys(&as_strs(&args.keys)));
    }
    if !args.prototype_keys.is_empty() {
        filters.push(by_prototype_keys(&as_strs(&args.prototype_keys)));
    }
    if !args.strings.is_empty() {
        filters.push(by_strings(&as_strs(&args.strings)));
    }
    if !args.source.is_empty() {
        filters.push(by_source(args.source.iter().cloned()));
    }
    if let Some(name) = &args.display_name {
        filters.push(by_display_name(name));
    }
    if let Some(name) = &args.store_name {
        filters.push(by_store_name(name));
    }

    if filters.len() == 1 {
        filters.remove(0)
    } else {
        combine(filters)
    }
}
