use crate::sources::{Extractor, Source};
use url::Url;

/// Hitokoto categories queried through the official endpoint
const HITOKOTO_CATEGORIES: &[(&str, &str)] =
    &[("a", "动画"), ("b", "漫画"), ("d", "文学"), ("i", "诗词")];

/// Builds the built-in source list, in registry order
///
/// Endpoints that accept a length bound get `max_length` so the server
/// filters before the local cap does.
pub(super) fn builtin_sources(max_length: Option<usize>) -> Vec<Source> {
    let mut sources = Vec::new();

    for (category, label) in HITOKOTO_CATEGORIES {
        let name = format!("一言（官方-{}）", label);
        if let Some(source) = source(&name, "https://v1.hitokoto.cn/", Extractor::Hitokoto) {
            let source = source
                .param("c", category)
                .param("encode", "json")
                .param("min_length", 1);
            sources.push(with_length_bound(source, max_length));
        }
    }

    if let Some(source) = source(
        "Hitokoto 国际版",
        "https://international.v1.hitokoto.cn/",
        Extractor::Hitokoto,
    ) {
        let source = source
            .param("c", "i")
            .param("c", "l")
            .param("c", "k")
            .param("encode", "json");
        sources.push(with_length_bound(source, max_length));
    }

    sources.extend(source(
        "韩小韩（一言镜像）",
        "https://api.vvhan.com/api/hitokoto",
        Extractor::Hitokoto,
    )
    .map(|s| s.param("type", "json")));

    sources.extend(source(
        "夏柔（一言镜像）",
        "https://api.xygeng.cn/one",
        Extractor::Xygeng,
    ));

    sources.extend(source(
        "今日诗词",
        "https://v2.jinrishici.com/one.json",
        Extractor::Jinrishici,
    ));

    sources
}

fn with_length_bound(source: Source, max_length: Option<usize>) -> Source {
    match max_length {
        Some(max) => source.param("max_length", max),
        None => source,
    }
}

fn source(name: &str, endpoint: &str, extractor: Extractor) -> Option<Source> {
    match Url::parse(endpoint) {
        Ok(url) => Some(Source::new(name, url, extractor)),
        Err(e) => {
            tracing::error!("Skipping built-in source {}: {}", name, e);
            None
        }
    }
}
