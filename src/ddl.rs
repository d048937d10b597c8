//! DDL 쿼리 주석 처리
//!
//! 하위 소비자 호환을 위해 SHARD_ROW_ID_BITS 절을 버전 게이트 주석으로
//! 감쌉니다. 주석 밖 텍스트는 바이트 단위로 보존됩니다.
//! 예: "ALTER TABLE t SHARD_ROW_ID_BITS=4"
//!  -> "ALTER TABLE t /*!90000 SHARD_ROW_ID_BITS=4 */"

use regex::Regex;
use std::sync::OnceLock;

/// 버전 게이트 주석 시작 마커
pub const SPECIAL_COMMENT_PREFIX: &str = "/*!90000 ";

const SPECIAL_COMMENT_SUFFIX: &str = " */";

fn shard_row_id_bits_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)SHARD_ROW_ID_BITS\s*=\s*\d+").expect("pattern is valid")
    })
}

/// DDL 쿼리에 버전 게이트 주석 삽입
///
/// 이미 마커가 있으면 그대로 반환합니다 (멱등). 절이 없어도 그대로
/// 반환하고, 여러 개면 첫 번째 절만 처리합니다.
pub fn add_version_comment(ddl_query: &str) -> String {
    if ddl_query.contains(SPECIAL_COMMENT_PREFIX) {
        return ddl_query.to_string();
    }

    let m = match shard_row_id_bits_pattern().find(ddl_query) {
        Some(m) => m,
        None => return ddl_query.to_string(),
    };

    format!(
        "{}{}{}{}{}",
        &ddl_query[..m.start()],
        SPECIAL_COMMENT_PREFIX,
        m.as_str(),
        SPECIAL_COMMENT_SUFFIX,
        &ddl_query[m.end()..]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotate_basic() {
        let annotated = add_version_comment("ALTER TABLE t SHARD_ROW_ID_BITS=4");
        assert_eq!(annotated, "ALTER TABLE t /*!90000 SHARD_ROW_ID_BITS=4 */");
    }

    #[test]
    fn test_idempotent() {
        let queries = [
            "ALTER TABLE t SHARD_ROW_ID_BITS=4",
            "CREATE TABLE t (a INT)",
            "alter table t shard_row_id_bits = 8;",
            "",
        ];
        for query in queries {
            let once = add_version_comment(query);
            let twice = add_version_comment(&once);
            assert_eq!(once, twice, "query: {:?}", query);
        }
    }

    #[test]
    fn test_no_clause_unchanged() {
        let query = "CREATE TABLE t (a INT PRIMARY KEY)";
        assert_eq!(add_version_comment(query), query);
    }

    #[test]
    fn test_case_insensitive_span_preserved() {
        // 매칭은 대소문자 무시, 주석 안 텍스트는 원문 그대로
        let annotated = add_version_comment("alter table t shard_row_id_bits = 8;");
        assert_eq!(annotated, "alter table t /*!90000 shard_row_id_bits = 8 */;");
    }

    #[test]
    fn test_first_match_only() {
        let annotated =
            add_version_comment("ALTER TABLE t SHARD_ROW_ID_BITS=2, SHARD_ROW_ID_BITS=3");
        assert_eq!(
            annotated,
            "ALTER TABLE t /*!90000 SHARD_ROW_ID_BITS=2 */, SHARD_ROW_ID_BITS=3"
        );
        assert_eq!(annotated.matches(SPECIAL_COMMENT_PREFIX).count(), 1);
    }

    #[test]
    fn test_surrounding_bytes_untouched() {
        let query = "CREATE TABLE x (id BIGINT) SHARD_ROW_ID_BITS=6 COMMENT='k'";
        let annotated = add_version_comment(query);

        let start = annotated.find(SPECIAL_COMMENT_PREFIX).unwrap();
        let end = annotated.find(SPECIAL_COMMENT_SUFFIX).unwrap() + SPECIAL_COMMENT_SUFFIX.len();
        assert_eq!(&annotated[..start], "CREATE TABLE x (id BIGINT) ");
        assert_eq!(&annotated[end..], " COMMENT='k'");
    }
}
