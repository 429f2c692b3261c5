use crate::models::{InstanceRecord, ProjectRecord};

/// Adds a finished project's bundles, version count and policy detail subtree
/// to the instance. Used for project records that were not counted while
/// being fetched.
pub fn merge_project_into_instance(project: &ProjectRecord, instance: &mut InstanceRecord) {
    instance.vulnerabilities.merge(&project.vulnerabilities);
    instance.policy_violations.merge(&project.policy_violations);
    instance.snippets.merge(&project.snippets);
    instance.project_total_version_count += project.project_version_count;
    instance.policy_details.merge(&project.policy_details);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PolicyCategory, PolicySeverity, RemediationStatus, Severity};

    #[test]
    fn test_merge_adds_every_bundle() {
        let mut project = ProjectRecord::new("p1", "Alpha", "t");
        project.vulnerabilities.record(RemediationStatus::Patched, Severity::Low);
        project.vulnerabilities.record(RemediationStatus::Patched, Severity::Low);
        project.policy_violations.record(PolicyCategory::Security, PolicySeverity::Critical, 3);
        project.snippets.record(1, 0, 1);
        project.project_version_count = 2;

        let mut instance = InstanceRecord::new(1);
        instance.vulnerabilities.record(RemediationStatus::New, Severity::High);
        merge_project_into_instance(&project, &mut instance);

        assert_eq!(instance.vulnerabilities.total, 3);
        assert_eq!(instance.vulnerabilities.status(RemediationStatus::Patched).low, 2);
        assert_eq!(instance.vulnerabilities.total, instance.vulnerabilities.status_sum());
        assert_eq!(instance.policy_violations.category(PolicyCategory::Security).critical, 3);
        assert_eq!(instance.snippets.total, 2);
        assert_eq!(instance.project_total_version_count, 2);
    }
}
