pub mod task_result_util;
