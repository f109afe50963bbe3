/// 记事本 API 客户端
///
/// 封装记事本导出接口的调用逻辑
use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult};
use tracing::{debug, info, warn};

/// 记事本客户端
pub struct NotepadClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    faculty_id: u32,
    course: String,
    dry_run: bool,
}

impl NotepadClient {
    /// 创建新的记事本客户端
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.muni.url.trim_end_matches('/').to_string(),
            token: config.muni.token.clone(),
            faculty_id: config.muni.faculty_id,
            course: config.muni.course.clone(),
            dry_run: config.dry_run,
        }
    }

    /// 获取记事本原始内容
    ///
    /// # 参数
    /// - `codename`: 记事本代号
    ///
    /// # 返回
    /// 返回原始 XML 字节；dry-run 模式下返回空内容
    pub async fn fetch_raw(&self, codename: &str) -> AppResult<Vec<u8>> {
        let url = self.build_notes_url(codename);
        info!("获取记事本: {}", codename);
        self.fetch(&url).await
    }

    /// 执行 GET 请求
    async fn fetch(&self, url: &str) -> AppResult<Vec<u8>> {
        let endpoint = self.redact(url);
        debug!("请求: {}", endpoint);

        if self.dry_run {
            debug!("dry-run 模式, 跳过请求");
            return Ok(Vec::new());
        }

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint.clone(), e))?;

        let status = response.status();
        if !status.is_success() {
            warn!("请求返回错误状态: {}", status);
            return Err(AppError::Api(ApiError::BadStatus {
                endpoint,
                status: status.as_u16(),
            }));
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| AppError::Api(ApiError::BodyReadFailed {
                endpoint: endpoint.clone(),
                source,
            }))?;

        debug!("收到 {} 字节", body.len());
        Ok(body.to_vec())
    }

    /// 构建记事本导出地址
    pub fn build_notes_url(&self, codename: &str) -> String {
        format!(
            "{}/export/pb_blok_api?klic={};fakulta={};kod={};operace=blok-dej-obsah;zkratka={}",
            self.base_url, self.token, self.faculty_id, self.course, codename
        )
    }

    /// 日志中隐藏令牌
    fn redact(&self, url: &str) -> String {
        if self.token.is_empty() {
            url.to_string()
        } else {
            url.replace(&self.token, "***")
        }
    }
}
