use crate::Rule;

mod asset_externalize;
mod distroless_swap;
mod ignore_bloat;
mod single_stage_to_multi;
mod slim_base;

/// The fixed rule order. Output ordering is by rule id regardless, so this
/// only determines evaluation order.
pub fn builtin_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(slim_base::SlimBase),
        Box::new(ignore_bloat::IgnoreBloat),
        Box::new(single_stage_to_multi::SingleStageToMulti),
        Box::new(distroless_swap::DistrolessSwap),
        Box::new(asset_externalize::AssetExternalize),
    ]
}

/// Static metadata for `explain` and `list-rules`.
#[derive(Debug, Clone, Copy)]
pub struct RuleMeta {
    pub id: &'static str,
    pub summary: &'static str,
    pub detail: &'static str,
}

pub fn rule_metas() -> Vec<RuleMeta> {
    vec![
        RuleMeta {
            id: "asset-externalize",
            summary: "Serve large static assets externally instead of baking them in",
            detail: "When the build context carries a large static-asset directory, every \
                     rebuild ships those bytes inside the image. Excluding the directory from \
                     the final COPY and serving it from a CDN or object storage keeps the \
                     image small; the assets must then be deployed separately.",
        },
        RuleMeta {
            id: "distroless-swap",
            summary: "Swap a general-purpose final base for a minimal runtime image",
            detail: "A final stage that runs no commands of its own does not need a shell or \
                     a package manager. A distroless-style base containing only the language \
                     runtime shrinks the image and its attack surface. Debugging inside the \
                     container gets harder; use an ephemeral debug container instead.",
        },
        RuleMeta {
            id: "ignore-bloat",
            summary: "Add ignore rules for known-bloat paths in the build context",
            detail: "Version-control directories, dependency caches, and stray logs routinely \
                     leak into images through COPY. Adding them to the ignore file keeps them \
                     out of every layer and also speeds up context upload.",
        },
        RuleMeta {
            id: "single-stage-to-multi",
            summary: "Split a single-stage build into build and runtime stages",
            detail: "A single stage that installs dependencies, compiles, and then starts the \
                     app ships its whole toolchain. Splitting into a build stage and a runtime \
                     stage that copies only the build output drops install-time bytes from the \
                     shipped image entirely.",
        },
        RuleMeta {
            id: "slim-base",
            summary: "Swap the final base image for its slimmer variant",
            detail: "Most official images publish slim or alpine variants that drop build \
                     toolchains and documentation. If the app only needs the runtime, the \
                     slim variant is a drop-in swap with a large, predictable saving.",
        },
    ]
}
