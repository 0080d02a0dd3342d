// ==========================================
// 供应商目录导入 - 关键词规则引擎
// ==========================================
// 匹配: 关键词与标题做大小写不敏感的子串包含；规则内关键词为"或"关系
// 三种策略:
// - PriorityFirst: 按 priority 降序稳定排序后首个命中（分类）
// - DeclaredFirst: 按声明顺序首个命中（类型）
// - UnionAll:      全部命中结果去重累加，保持首次出现顺序（标签）
// 发布: 标题含任一排除词 → 不发布，否则取默认发布状态
// ==========================================

use crate::config::VendorConfig;
use std::cmp::Reverse;
use std::fmt;

// ==========================================
// MatchStrategy - 规则扫描策略
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    PriorityFirst,
    DeclaredFirst,
    UnionAll,
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStrategy::PriorityFirst => write!(f, "PRIORITY_FIRST"),
            MatchStrategy::DeclaredFirst => write!(f, "DECLARED_FIRST"),
            MatchStrategy::UnionAll => write!(f, "UNION_ALL"),
        }
    }
}

// ==========================================
// KeywordRule - 编译后的关键词规则
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordRule<T> {
    keywords: Vec<String>, // 已转小写（保留首尾空白），已剔除空串
    pub result: T,
    pub priority: i32,
}

impl<T> KeywordRule<T> {
    pub fn new<S: AsRef<str>>(keywords: &[S], result: T, priority: i32) -> Self {
        Self {
            keywords: normalize_keywords(keywords),
            result,
            priority,
        }
    }

    /// title_lower 须已转小写
    fn matches(&self, title_lower: &str) -> bool {
        self.keywords.iter().any(|k| title_lower.contains(k.as_str()))
    }
}

fn normalize_keywords<S: AsRef<str>>(keywords: &[S]) -> Vec<String> {
    keywords
        .iter()
        .map(|k| k.as_ref().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

// ==========================================
// RuleSet - 有序规则集
// ==========================================
#[derive(Debug, Clone)]
pub struct RuleSet<T> {
    strategy: MatchStrategy,
    rules: Vec<KeywordRule<T>>,
}

impl<T> RuleSet<T> {
    /// PriorityFirst 在构造时做一次稳定排序，同优先级保持声明顺序
    pub fn new(strategy: MatchStrategy, mut rules: Vec<KeywordRule<T>>) -> Self {
        if strategy == MatchStrategy::PriorityFirst {
            rules.sort_by_key(|r| Reverse(r.priority));
        }
        Self { strategy, rules }
    }

    pub fn strategy(&self) -> MatchStrategy {
        self.strategy
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// 首个命中规则的结果
    pub fn match_first(&self, title: &str) -> Option<&T> {
        let title_lower = title.to_lowercase();
        self.rules
            .iter()
            .find(|r| r.matches(&title_lower))
            .map(|r| &r.result)
    }

    /// 全部命中规则的结果（按扫描顺序）
    pub fn match_all<'a>(&'a self, title: &str) -> impl Iterator<Item = &'a T> + 'a {
        let title_lower = title.to_lowercase();
        self.rules
            .iter()
            .filter(move |r| r.matches(&title_lower))
            .map(|r| &r.result)
    }
}

// ==========================================
// RuleEngine - 分类 / 类型 / 标签 / 发布判定
// ==========================================
#[derive(Debug, Clone)]
pub struct RuleEngine {
    categories: RuleSet<String>,
    types: RuleSet<String>,
    tags: RuleSet<Vec<String>>,
    exclude_keywords: Vec<String>,
    default_category: String,
    default_type: String,
    base_tags: Vec<String>,
    default_published: bool,
}

impl RuleEngine {
    /// 从配置编译规则（配置不变，引擎只读）
    pub fn from_config(config: &VendorConfig) -> Self {
        let categories = config
            .category_rules
            .iter()
            .map(|r| KeywordRule::new(r.keywords.as_slice(), r.category.clone(), r.priority))
            .collect();
        let types = config
            .type_rules
            .iter()
            .map(|r| KeywordRule::new(r.keywords.as_slice(), r.product_type.clone(), 0))
            .collect();
        let tags = config
            .tag_rules
            .iter()
            .map(|r| KeywordRule::new(r.keywords.as_slice(), r.tags.clone(), 0))
            .collect();

        Self {
            categories: RuleSet::new(MatchStrategy::PriorityFirst, categories),
            types: RuleSet::new(MatchStrategy::DeclaredFirst, types),
            tags: RuleSet::new(MatchStrategy::UnionAll, tags),
            exclude_keywords: normalize_keywords(config.publishing_rules.exclude_keywords.as_slice()),
            default_category: config.defaults.category.clone(),
            default_type: config.defaults.product_type.clone(),
            base_tags: config.defaults.tags.clone(),
            default_published: config.defaults.published,
        }
    }

    /// 分类（无命中 → 默认分类）
    pub fn category(&self, title: &str) -> String {
        self.categories
            .match_first(title)
            .unwrap_or(&self.default_category)
            .clone()
    }

    /// 类型（无命中 → 默认类型）
    pub fn product_type(&self, title: &str) -> String {
        self.types
            .match_first(title)
            .unwrap_or(&self.default_type)
            .clone()
    }

    /// 标签: 基础标签 + 全部命中规则的标签，按原值去重，保持首次出现顺序
    pub fn tags(&self, title: &str) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let candidates = self
            .base_tags
            .iter()
            .chain(self.tags.match_all(title).flatten());

        for tag in candidates {
            if !out.contains(tag) {
                out.push(tag.clone());
            }
        }
        out
    }

    /// 标题是否命中排除词
    pub fn is_excluded(&self, title: &str) -> bool {
        let title_lower = title.to_lowercase();
        self.exclude_keywords
            .iter()
            .any(|k| title_lower.contains(k.as_str()))
    }

    /// 发布状态
    pub fn published(&self, title: &str) -> bool {
        if self.is_excluded(title) {
            false
        } else {
            self.default_published
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CategoryRule, TagRule, TypeRule};

    fn engine() -> RuleEngine {
        let mut config = VendorConfig::default();
        config.defaults.category = "Default Category".to_string();
        config.defaults.product_type = "Crystal".to_string();
        config.defaults.tags = vec!["Spiritual".to_string(), "Natural".to_string()];
        config.category_rules = vec![
            CategoryRule {
                keywords: vec!["stone".to_string()],
                category: "Stones A".to_string(),
                priority: 5,
            },
            CategoryRule {
                keywords: vec!["stone".to_string()],
                category: "Stones B".to_string(),
                priority: 5,
            },
            CategoryRule {
                keywords: vec!["pendant".to_string(), "necklace".to_string()],
                category: "Jewelry".to_string(),
                priority: 10,
            },
        ];
        config.type_rules = vec![
            TypeRule {
                keywords: vec!["pendant".to_string()],
                product_type: "Pendant".to_string(),
            },
            TypeRule {
                keywords: vec!["amethyst".to_string()],
                product_type: "Amethyst".to_string(),
            },
        ];
        config.tag_rules = vec![
            TagRule {
                keywords: vec!["amethyst".to_string()],
                tags: vec!["Amethyst".to_string(), "Purple Crystal".to_string()],
            },
            TagRule {
                keywords: vec!["raw".to_string(), "rough".to_string()],
                tags: vec!["Natural".to_string(), "Raw".to_string()],
            },
        ];
        config.publishing_rules.exclude_keywords = vec!["Sample".to_string(), String::new()];
        RuleEngine::from_config(&config)
    }

    #[test]
    fn test_category_priority_order() {
        let engine = engine();
        // priority 10 优先于声明在前的 priority 5
        assert_eq!(engine.category("Stone Pendant"), "Jewelry");
    }

    #[test]
    fn test_category_tie_break_by_declaration() {
        assert_eq!(engine().category("Rose Quartz Stone"), "Stones A");
    }

    #[test]
    fn test_category_default() {
        assert_eq!(engine().category("Incense Holder"), "Default Category");
    }

    #[test]
    fn test_type_declared_order() {
        let engine = engine();
        assert_eq!(engine.product_type("AMETHYST PENDANT"), "Pendant");
        assert_eq!(engine.product_type("Amethyst Cluster"), "Amethyst");
        assert_eq!(engine.product_type("Plain Stone"), "Crystal");
    }

    #[test]
    fn test_tags_union_dedup() {
        let engine = engine();
        let tags = engine.tags("Raw Rough Amethyst");
        assert_eq!(
            tags,
            vec!["Spiritual", "Natural", "Amethyst", "Purple Crystal", "Raw"]
        );
    }

    #[test]
    fn test_tags_base_only() {
        assert_eq!(engine().tags("Plain Stone"), vec!["Spiritual", "Natural"]);
    }

    #[test]
    fn test_publish_exclusion() {
        let engine = engine();
        assert!(!engine.published("Free SAMPLE pack"));
        // 空排除词不命中
        assert!(engine.published("Amethyst Pendant"));
    }

    #[test]
    fn test_padded_keyword_is_word_boundary() {
        let mut config = VendorConfig::default();
        config.defaults.category = "Default Category".to_string();
        config.category_rules = vec![CategoryRule {
            keywords: vec![" ring".to_string()],
            category: "Rings".to_string(),
            priority: 1,
        }];
        config.type_rules = vec![TypeRule {
            keywords: vec![" ring".to_string()],
            product_type: "Ring".to_string(),
        }];
        config.publishing_rules.exclude_keywords = vec![" set".to_string()];
        let engine = RuleEngine::from_config(&config);

        assert_eq!(engine.product_type("Silver Earrings"), "Product");
        assert_eq!(engine.category("Silver Earrings"), "Default Category");
        assert_eq!(engine.product_type("Moonstone Ring"), "Ring");
        assert_eq!(engine.category("Moonstone Ring"), "Rings");

        assert!(engine.published("Sunset Agate"));
        assert!(!engine.published("Chakra Set"));
    }

    #[test]
    fn test_tags_kept_as_configured() {
        let mut config = VendorConfig::default();
        config.defaults.tags = vec!["Spiritual".to_string()];
        config.tag_rules = vec![
            TagRule {
                keywords: vec!["agate".to_string()],
                tags: vec!["Agate ".to_string(), "Spiritual".to_string()],
            },
            TagRule {
                keywords: vec!["blue".to_string()],
                tags: vec!["Agate ".to_string(), "Blue".to_string()],
            },
        ];
        let engine = RuleEngine::from_config(&config);

        assert_eq!(engine.tags("Blue Lace Agate"), vec!["Spiritual", "Agate ", "Blue"]);
    }

    #[test]
    fn test_rule_set_strategies() {
        let rules = vec![
            KeywordRule::new(&["a"], 1, 0),
            KeywordRule::new(&["a"], 2, 3),
            KeywordRule::new(&[""], 3, 9),
        ];
        let first = RuleSet::new(MatchStrategy::PriorityFirst, rules.clone());
        assert_eq!(first.match_first("A"), Some(&2));

        let declared = RuleSet::new(MatchStrategy::DeclaredFirst, rules.clone());
        assert_eq!(declared.match_first("a"), Some(&1));

        let all = RuleSet::new(MatchStrategy::UnionAll, rules);
        assert_eq!(all.match_all("a").copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(all.match_first("zzz"), None);
    }
}
