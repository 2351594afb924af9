use sea_orm::ActiveEnum;

use crate::entity::sea_orm_active_enums::IssuePriority;
use crate::model::global_error::AppError;
use crate::model::issue::{IssueBoardQuery, IssueResponse};

/// Narrows a board to the issues the user is looking for. An empty filter keeps everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueFilter {
    pub search: Option<String>,
    pub priorities: Vec<IssuePriority>,
    pub assignees: Vec<i32>,
}

fn split_list(raw: &Option<String>) -> impl Iterator<Item = &str> {
    raw.as_deref()
        .unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

impl IssueFilter {
    pub fn from_query(query: &IssueBoardQuery) -> Result<Self, AppError> {
        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let priorities = split_list(&query.priority)
            .map(|raw| {
                IssuePriority::try_from_value(&raw.to_uppercase())
                    .map_err(|_| AppError::field("priority", &format!("알 수 없는 우선순위입니다: {}", raw)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let assignees = split_list(&query.assignee)
            .map(|raw| {
                raw.parse::<i32>()
                    .map_err(|_| AppError::field("assignee", &format!("잘못된 사용자 ID입니다: {}", raw)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { search, priorities, assignees })
    }

    pub fn is_empty(&self) -> bool {
        self.search.is_none() && self.priorities.is_empty() && self.assignees.is_empty()
    }

    pub fn matches(&self, issue: &IssueResponse) -> bool {
        if let Some(search) = &self.search {
            if !issue.title.to_lowercase().contains(search.as_str()) {
                return false;
            }
        }

        if !self.priorities.is_empty() && !self.priorities.contains(&issue.priority) {
            return false;
        }

        if !self.assignees.is_empty() {
            let assignee_id = issue.assignee.as_ref().map(|user| user.id);
            if !assignee_id.is_some_and(|id| self.assignees.contains(&id)) {
                return false;
            }
        }

        true
    }

    pub fn apply(&self, issues: Vec<IssueResponse>) -> Vec<IssueResponse> {
        if self.is_empty() {
            return issues;
        }
        issues.into_iter().filter(|issue| self.matches(issue)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::sea_orm_active_enums::IssueStatus;
    use crate::model::global_error::ErrorCode;
    use crate::model::issue::UserSummary;
    use chrono::Utc;
    use rstest::rstest;

    fn issue(id: i32, title: &str, priority: IssuePriority, assignee: Option<i32>) -> IssueResponse {
        IssueResponse {
            id,
            title: title.to_string(),
            description: None,
            status: IssueStatus::Todo,
            priority,
            order: id,
            project_id: 1,
            sprint_id: Some(1),
            assignee: assignee.map(|id| UserSummary {
                id,
                username: format!("user{}", id),
                email: format!("user{}@example.com", id),
            }),
            reporter: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn board() -> Vec<IssueResponse> {
        vec![
            issue(1, "Login page crashes", IssuePriority::High, Some(7)),
            issue(2, "Update README", IssuePriority::Low, None),
            issue(3, "login rate limit", IssuePriority::Urgent, Some(8)),
        ]
    }

    fn query(search: Option<&str>, priority: Option<&str>, assignee: Option<&str>) -> IssueBoardQuery {
        IssueBoardQuery {
            search: search.map(String::from),
            priority: priority.map(String::from),
            assignee: assignee.map(String::from),
        }
    }

    #[rstest]
    #[case::empty(query(None, None, None), vec![1, 2, 3])]
    #[case::search_is_case_insensitive(query(Some("LOGIN"), None, None), vec![1, 3])]
    #[case::blank_search_ignored(query(Some("   "), None, None), vec![1, 2, 3])]
    #[case::priorities(query(None, Some("high, urgent"), None), vec![1, 3])]
    #[case::assignee_excludes_unassigned(query(None, None, Some("7")), vec![1])]
    #[case::combined(query(Some("login"), Some("URGENT"), Some("7,8")), vec![3])]
    fn filters_board(#[case] query: IssueBoardQuery, #[case] expected: Vec<i32>) {
        let filter = IssueFilter::from_query(&query).unwrap();

        let ids: Vec<i32> = filter.apply(board()).iter().map(|i| i.id).collect();

        assert_eq!(ids, expected);
    }

    #[rstest]
    #[case(query(None, Some("critical"), None))]
    #[case(query(None, None, Some("abc")))]
    fn rejects_malformed_query(#[case] query: IssueBoardQuery) {
        let err = IssueFilter::from_query(&query).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);
    }
}
