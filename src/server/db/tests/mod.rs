
use super::Database;

pub fn run_all_tests(db: &Database) {
    curd::run_curd_tests(db);
    curd::run_page_tests(db);
    curd::run_rollback_tests(db);
}
