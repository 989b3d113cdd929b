use crate::{Rule, RuleContext, build_suggestion};
use imageslim_types::files::FileEntry;
use imageslim_types::suggestion::Suggestion;

/// When the context carries a heavy static-asset directory, propose keeping
/// it out of the final COPY and serving it externally instead.
pub struct AssetExternalize;

impl AssetExternalize {
    pub const RULE_ID: &'static str = "asset-externalize";
}

impl Rule for AssetExternalize {
    fn id(&self) -> &'static str {
        Self::RULE_ID
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> anyhow::Result<Option<Suggestion>> {
        let mut fired_dirs: Vec<(&str, u64)> = Vec::new();
        for dir in &ctx.inputs.asset_paths {
            let bytes: u64 = ctx
                .files
                .iter()
                .filter(|f| f.path.starts_with(dir.as_str()))
                .map(|f| f.size_bytes)
                .sum();
            if bytes > 0 {
                fired_dirs.push((dir.as_str(), bytes));
            }
        }

        let asset_bytes: u64 = fired_dirs.iter().map(|(_, bytes)| bytes).sum();
        if asset_bytes <= ctx.inputs.asset_threshold_bytes {
            return Ok(None);
        }

        let pruned: Vec<FileEntry> = ctx
            .files
            .iter()
            .filter(|f| !fired_dirs.iter().any(|(dir, _)| f.path.starts_with(dir)))
            .cloned()
            .collect();

        let added: Vec<String> = fired_dirs.iter().map(|(dir, _)| dir.to_string()).collect();
        let notes = fired_dirs
            .iter()
            .map(|(dir, bytes)| {
                format!(
                    "~{} MB under `{dir}` must be served externally (CDN or object storage)",
                    bytes / 1_000_000
                )
            })
            .collect();

        let suggestion = build_suggestion(
            ctx,
            Self::RULE_ID,
            format!(
                "Exclude ~{} MB of static assets from the final COPY and serve them externally",
                asset_bytes / 1_000_000
            ),
            ctx.spec.clone(),
            &pruned,
            notes,
            added,
        )?;
        Ok(Some(suggestion))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RuleInputs;
    use imageslim_estimate::{ImageSizeTable, RunCostModel, estimate};
    use imageslim_parse::parse;
    use pretty_assertions::assert_eq;

    fn node_ctx(
        files: &[FileEntry],
    ) -> (
        imageslim_types::spec::BuildSpec,
        imageslim_types::estimate::SizeEstimate,
        ImageSizeTable,
        RunCostModel,
    ) {
        let spec = parse("FROM node:18\nCOPY . .\nCMD [\"node\"]\n").expect("parse");
        let mut table = ImageSizeTable::default();
        table.insert("node:18", 100_000_000);
        let cost_model = RunCostModel::default();
        let original = estimate(&spec, files, &table, &cost_model).expect("estimate");
        (spec, original, table, cost_model)
    }

    #[test]
    fn fires_above_the_threshold_and_notes_external_serving() {
        let files = vec![
            FileEntry::new("server.js", 1_000_000),
            FileEntry::new("public/videos/intro.mp4", 80_000_000),
            FileEntry::new("public/img/logo.png", 2_000_000),
        ];
        let (spec, original, table, cost_model) = node_ctx(&files);
        let inputs = RuleInputs::default();
        let ctx = RuleContext {
            spec: &spec,
            estimate: &original,
            files: &files,
            inputs: &inputs,
            size_table: &table,
            cost_model: &cost_model,
        };

        let suggestion = AssetExternalize
            .evaluate(&ctx)
            .expect("evaluate")
            .expect("should fire");
        assert_eq!(suggestion.added_ignore_rules, vec!["public".to_string()]);
        assert_eq!(suggestion.estimated_total_bytes, 101_000_000);
        assert_eq!(suggestion.savings_bytes, 82_000_000);
        assert!(suggestion.notes[0].contains("served externally"));
    }

    #[test]
    fn silent_below_the_threshold() {
        let files = vec![
            FileEntry::new("server.js", 1_000_000),
            FileEntry::new("public/img/logo.png", 2_000_000),
        ];
        let (spec, original, table, cost_model) = node_ctx(&files);
        let inputs = RuleInputs::default();
        let ctx = RuleContext {
            spec: &spec,
            estimate: &original,
            files: &files,
            inputs: &inputs,
            size_table: &table,
            cost_model: &cost_model,
        };

        assert!(AssetExternalize.evaluate(&ctx).expect("evaluate").is_none());
    }
}
