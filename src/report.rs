use crate::analytics::{Stats, TrendPoint};
use crate::model::FilterSpec;

const ALL_CLASSES_SCOPE: &str = "所有班级";
const ALL_COURSES_SCOPE: &str = "所有课程";

pub const DISTRIBUTION_EMPTY_MESSAGE: &str = "当前筛选条件下，暂无成绩数据可生成饼图！";

/// One decimal place, rounded from the exact binary value (61.05 is stored as 61.0499.. and shows 61.0).
pub fn fmt_1dp(x: f64) -> String {
    format!("{:.1}", x)
}

pub fn class_scope(spec: &FilterSpec) -> &str {
    spec.class_filter.as_deref().unwrap_or(ALL_CLASSES_SCOPE)
}

pub fn course_scope(spec: &FilterSpec) -> &str {
    spec.course_filter.as_deref().unwrap_or(ALL_COURSES_SCOPE)
}

pub fn format_stats_report(spec: &FilterSpec, stats: &Stats) -> String {
    let mut out = String::new();
    out.push_str("========== 学生成绩统计分析报表 ==========\n");
    out.push_str(&format!(
        "统计范围：{} | {}\n",
        class_scope(spec),
        course_scope(spec)
    ));
    out.push_str("-----------------------------------------\n");
    out.push_str(&format!("统计总条数 ：{}\n", stats.count));
    out.push_str(&format!("平均分     ：{} 分\n", fmt_1dp(stats.avg)));
    out.push_str(&format!("最高分     ：{} 分\n", stats.max));
    out.push_str(&format!("最低分     ：{} 分\n", stats.min));
    out.push_str(&format!("及格率(≥60)：{}%\n", fmt_1dp(stats.pass_rate)));
    out.push_str(&format!("优秀率(≥85)：{}%\n", fmt_1dp(stats.excellence_rate)));
    out.push_str("=========================================\n");
    out
}

pub fn trend_entry_line(point: &TrendPoint) -> String {
    format!("{} ： {} 分", point.exam_date.format("%Y-%m-%d"), point.score)
}

pub fn trend_title(student_name: &str, course_name: &str) -> String {
    format!("{} - {} 成绩变化趋势图", student_name, course_name)
}

pub fn trend_series_name(student_name: &str, course_name: &str) -> String {
    format!("{} - {} 成绩变化", student_name, course_name)
}

pub fn trend_detail(student_name: &str, course_name: &str, points: &[TrendPoint]) -> String {
    let mut out = format!("\n【{} - {} 成绩趋势明细】\n", student_name, course_name);
    for p in points {
        out.push_str(&trend_entry_line(p));
        out.push('\n');
    }
    out
}

pub fn trend_not_found_message(student_name: &str, course_name: &str) -> String {
    format!("未查询到【{}】的【{}】成绩数据！", student_name, course_name)
}

pub fn distribution_title(spec: &FilterSpec) -> String {
    format!(
        "{} - {} 成绩等级占比统计",
        class_scope(spec),
        course_scope(spec)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn stats_report_layout_for_unconstrained_scope() {
        let stats = Stats {
            count: 2,
            avg: 75.0,
            max: 95,
            min: 55,
            pass_rate: 50.0,
            excellence_rate: 50.0,
        };
        let text = format_stats_report(&FilterSpec::all(), &stats);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[0], "========== 学生成绩统计分析报表 ==========");
        assert_eq!(lines[1], "统计范围：所有班级 | 所有课程");
        assert_eq!(lines[3], "统计总条数 ：2");
        assert_eq!(lines[4], "平均分     ：75.0 分");
        assert_eq!(lines[5], "最高分     ：95 分");
        assert_eq!(lines[6], "最低分     ：55 分");
        assert_eq!(lines[7], "及格率(≥60)：50.0%");
        assert_eq!(lines[8], "优秀率(≥85)：50.0%");
        assert!(text.ends_with("=========================================\n"));
    }

    #[test]
    fn stats_report_names_active_filters_and_rounds() {
        let spec = FilterSpec {
            class_filter: Some("C1".to_string()),
            course_filter: None,
        };
        let stats = Stats {
            count: 3,
            avg: 211.0 / 3.0,
            max: 71,
            min: 70,
            pass_rate: 200.0 / 3.0,
            excellence_rate: 0.0,
        };
        let text = format_stats_report(&spec, &stats);
        assert!(text.contains("统计范围：C1 | 所有课程\n"));
        assert!(text.contains("平均分     ：70.3 分\n"));
        assert!(text.contains("及格率(≥60)：66.7%\n"));
        assert!(text.contains("优秀率(≥85)：0.0%\n"));
    }

    #[test]
    fn display_rounds_the_stored_binary_value() {
        let records: Vec<crate::model::ScoreRecord> = (0..20)
            .map(|i| crate::model::ScoreRecord {
                id: format!("r{}", i),
                student_name: format!("S{}", i),
                student_class: "C1".to_string(),
                course_name: "Math".to_string(),
                score: if i == 0 { 62 } else { 61 },
                exam_date: NaiveDate::from_ymd_opt(2024, 3, 1).expect("date"),
            })
            .collect();
        let stats = crate::analytics::compute_stats(&records);
        assert_eq!(stats.count, 20);
        assert!((stats.avg - 1221.0 / 20.0).abs() < 1e-12);
        assert_eq!(fmt_1dp(stats.avg), "61.0");
        assert!(format_stats_report(&FilterSpec::all(), &stats).contains("平均分     ：61.0 分\n"));

        assert_eq!(fmt_1dp(0.0), "0.0");
        assert_eq!(fmt_1dp(3.54), "3.5");
        assert_eq!(fmt_1dp(200.0 / 3.0), "66.7");
    }

    #[test]
    fn empty_stats_render_as_zeroes() {
        let text = format_stats_report(&FilterSpec::all(), &Stats::default());
        assert!(text.contains("统计总条数 ：0\n"));
        assert!(text.contains("平均分     ：0.0 分\n"));
        assert!(text.contains("最高分     ：0 分\n"));
        assert!(text.contains("及格率(≥60)：0.0%\n"));
    }

    #[test]
    fn trend_detail_lists_each_exam() {
        let points = vec![
            TrendPoint {
                index: 0,
                score: 55,
                exam_date: NaiveDate::from_ymd_opt(2024, 3, 1).expect("date"),
            },
            TrendPoint {
                index: 1,
                score: 95,
                exam_date: NaiveDate::from_ymd_opt(2024, 4, 1).expect("date"),
            },
        ];
        let text = trend_detail("Alice", "Math", &points);
        assert_eq!(
            text,
            "\n【Alice - Math 成绩趋势明细】\n2024-03-01 ： 55 分\n2024-04-01 ： 95 分\n"
        );
        assert_eq!(trend_title("Alice", "Math"), "Alice - Math 成绩变化趋势图");
    }

    #[test]
    fn distribution_title_uses_scope_labels() {
        let spec = FilterSpec {
            class_filter: None,
            course_filter: Some("Math".to_string()),
        };
        assert_eq!(distribution_title(&spec), "所有班级 - Math 成绩等级占比统计");
    }
}
