//! `eco check`: Validate config, catalog and content roots.

use eco_assembler::ModuleLoader;
use eco_assembler::greeting::GREETING_TEMPLATE;
use eco_config::{AppConfig, Catalog, CatalogError};
use eco_core::ContentRoot;

/// Whether the greeting shortcut can read its template. Greetings read the
/// template from the base root only.
#[derive(Debug, PartialEq, Eq)]
enum GreetingTemplate {
    Present,
    Missing,
    Unreadable(String),
}

async fn greeting_template(loader: &ModuleLoader) -> GreetingTemplate {
    match loader.read_from(ContentRoot::Base, GREETING_TEMPLATE).await {
        Ok(Some(_)) => GreetingTemplate::Present,
        Ok(None) => GreetingTemplate::Missing,
        Err(e) => GreetingTemplate::Unreadable(e.to_string()),
    }
}

pub async fn run(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Eco Check");
    println!("===========\n");

    let mut issues = 0;

    // Config is validated on load
    println!("  ✅ Config valid");
    println!(
        "     thresholds {} / {} (recall), budget {} tokens",
        config.retrieval.default_threshold,
        config.retrieval.recall_threshold,
        config.budget.max_prompt_tokens
    );

    // Catalog
    let catalog_path = config.content.catalog_path();
    let catalog = match Catalog::load_from(&catalog_path) {
        Ok(catalog) => {
            println!(
                "  ✅ Catalog loaded: {} cognitive, {} philosophical, {} stoic, {} emotional",
                catalog.cognitive.len(),
                catalog.philosophical.len(),
                catalog.stoic.len(),
                catalog.emotional.len()
            );
            Some(catalog)
        }
        Err(CatalogError::NotFound(path)) => {
            println!("  ⚠️  No catalog at {}; only base modules will load", path.display());
            issues += 1;
            None
        }
        Err(e) => {
            println!("  ❌ Catalog invalid: {e}");
            issues += 1;
            None
        }
    };

    if let Some(catalog) = &catalog {
        for (file, err) in catalog.invalid_conditions() {
            println!("  ❌ Condition for {file} does not parse: {err}");
            issues += 1;
        }
    }

    // Content roots
    for root in ContentRoot::SEARCH_ORDER {
        let dir = config.content.root_dir(root);
        if dir.is_dir() {
            println!("  ✅ {root} root: {}", dir.display());
        } else {
            println!("  ⚠️  {root} root missing: {}", dir.display());
            issues += 1;
        }
    }

    // Modules referenced by the catalog
    match eco_assembler::build_from_config(config).await {
        Ok(builder) => {
            let loader = builder.loader();
            match greeting_template(loader).await {
                GreetingTemplate::Present => {
                    println!("  ✅ Greeting template {GREETING_TEMPLATE} present");
                }
                GreetingTemplate::Missing => {
                    let base = ContentRoot::Base;
                    println!("  ❌ Greeting template {GREETING_TEMPLATE} not found in {base} root");
                    issues += 1;
                }
                GreetingTemplate::Unreadable(reason) => {
                    println!("  ❌ Greeting template {GREETING_TEMPLATE} unreadable: {reason}");
                    issues += 1;
                }
            }
            let mut missing = Vec::new();
            let closing = builder.settings().closing_modules.iter().map(String::as_str);
            for file in builder.catalog().referenced_files().into_iter().chain(closing) {
                if loader.resolve(file).await.is_none() {
                    missing.push(file.to_string());
                }
            }
            if missing.is_empty() {
                println!("  ✅ All catalog modules present");
            } else {
                for file in &missing {
                    println!("  ⚠️  Module not found in any root: {file}");
                }
                issues += missing.len();
            }
        }
        Err(e) => {
            println!("  ❌ Assembler could not be built: {e}");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
        Ok(())
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
        Err(format!("{issues} issue(s) found").into())
    }
}
