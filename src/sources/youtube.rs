use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, COOKIE};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use super::{CaptionEntry, CaptionTrack, SourceError, TranscriptSource, VideoId};
use crate::config::Config;

const WATCH_URL: &str = "https://www.youtube.com/watch";
const INNERTUBE_PLAYER_URL: &str = "https://www.youtube.com/youtubei/v1/player";
const INNERTUBE_CLIENT_NAME: &str = "ANDROID";
const INNERTUBE_CLIENT_VERSION: &str = "20.10.38";
const CONSENT_FORM_MARKER: &str = "action=\"https://consent.youtube.com/s\"";

/// Caption track plus the URL its content is served from
#[derive(Debug, Clone, PartialEq)]
struct TrackInfo {
    track: CaptionTrack,
    base_url: String,
}

/// YouTube transcript source using the InnerTube player API
pub struct YoutubeSource {
    client: Client,
}

impl YoutubeSource {
    /// Build a source whose requests all go through the configured proxy
    pub fn new(config: &Config) -> Result<Self, SourceError> {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&config.http.accept_language) {
            headers.insert(ACCEPT_LANGUAGE, value);
        }

        let mut builder = Client::builder()
            .default_headers(headers)
            .user_agent(config.http.user_agent.as_str());

        if config.proxy.is_enabled() {
            let proxy = reqwest::Proxy::all(config.proxy.url())?
                .basic_auth(&config.proxy.rotating_username(), config.proxy.credentials.password());
            builder = builder.proxy(proxy);
            tracing::debug!(proxy = %config.proxy.url(), credentials = true, "Using rotating proxy");
        } else {
            tracing::debug!("No proxy credentials set, connecting directly");
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Fetch the watch page, getting past the consent interstitial once if needed
    async fn fetch_watch_html(&self, video_id: &str) -> Result<String, SourceError> {
        tracing::debug!("Fetching watch page for: {}", video_id);

        let response = self
            .client
            .get(WATCH_URL)
            .query(&[("v", video_id)])
            .send()
            .await?;
        let html = check_status(response, video_id)?.text().await?;

        if !html.contains(CONSENT_FORM_MARKER) {
            return Ok(html);
        }

        let consent = extract_consent_value(&html)
            .ok_or_else(|| SourceError::ConsentRequired(video_id.to_string()))?;

        tracing::debug!("Consent page served, retrying with consent cookie");
        let response = self
            .client
            .get(WATCH_URL)
            .query(&[("v", video_id)])
            .header(COOKIE, format!("CONSENT=YES+{}", consent))
            .send()
            .await?;
        let html = check_status(response, video_id)?.text().await?;

        if html.contains(CONSENT_FORM_MARKER) {
            return Err(SourceError::ConsentRequired(video_id.to_string()));
        }

        Ok(html)
    }

    async fn fetch_player_response(&self, video_id: &str, api_key: &str) -> Result<Value, SourceError> {
        let body = json!({
            "context": {
                "client": {
                    "clientName": INNERTUBE_CLIENT_NAME,
                    "clientVersion": INNERTUBE_CLIENT_VERSION
                }
            },
            "videoId": video_id
        });

        let response = self
            .client
            .post(INNERTUBE_PLAYER_URL)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await?;

        let text = check_status(response, video_id)?.text().await?;
        serde_json::from_str(&text).map_err(|e| SourceError::Unparsable {
            video_id: video_id.to_string(),
            detail: format!("player response is not JSON: {}", e),
        })
    }

    async fn track_list(&self, video_id: &str) -> Result<Vec<TrackInfo>, SourceError> {
        let html = self.fetch_watch_html(video_id).await?;
        let api_key = extract_innertube_api_key(&html, video_id)?;
        let player = self.fetch_player_response(video_id, &api_key).await?;

        assert_playability(video_id, &player)?;
        parse_caption_tracks(video_id, &player)
    }
}

#[async_trait]
impl TranscriptSource for YoutubeSource {
    async fn list_tracks(&self, video: &VideoId) -> Result<Vec<CaptionTrack>, SourceError> {
        let video_id = extract_video_id(video.as_str());
        let tracks = self.track_list(&video_id).await?;

        tracing::debug!("Found {} caption tracks for {}", tracks.len(), video_id);
        Ok(tracks.into_iter().map(|info| info.track).collect())
    }

    async fn fetch_entries(
        &self,
        video: &VideoId,
        languages: &[String],
    ) -> Result<Vec<CaptionEntry>, SourceError> {
        let video_id = extract_video_id(video.as_str());
        let tracks = self.track_list(&video_id).await?;

        let info = select_track(&tracks, languages).ok_or_else(|| SourceError::NoTranscriptFound {
            video_id: video_id.clone(),
            languages: languages.to_vec(),
        })?;

        if info.base_url.contains("&exp=xpe") {
            return Err(SourceError::PoTokenRequired(video_id));
        }

        tracing::info!(
            "Downloading {} captions for {}{}",
            info.track.language_code,
            video_id,
            if info.track.is_generated { " (auto-generated)" } else { "" }
        );

        let response = self.client.get(caption_url(&info.base_url)).send().await?;
        let body = check_status(response, &video_id)?.text().await?;

        parse_json3(&video_id, &body)
    }
}

/// Map error statuses; 429 means the exit IP is rate limited
fn check_status(response: Response, video_id: &str) -> Result<Response, SourceError> {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(SourceError::RequestBlocked(video_id.to_string()));
    }
    if !status.is_success() {
        let mut url = response.url().clone();
        url.set_query(None);
        return Err(SourceError::HttpStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(response)
}

/// Pull the video id out of a YouTube URL. Anything that is not a recognised
/// YouTube URL is returned unchanged.
pub fn extract_video_id(input: &str) -> String {
    let input = input.trim();

    let candidate = if input.starts_with("http://") || input.starts_with("https://") {
        input.to_string()
    } else if input.contains("youtube.com/") || input.contains("youtu.be/") {
        format!("https://{}", input)
    } else {
        return input.to_string();
    };

    let Ok(url) = Url::parse(&candidate) else {
        return input.to_string();
    };

    video_id_from_url(&url).unwrap_or_else(|| input.to_string())
}

fn video_id_from_url(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_ascii_lowercase();

    if host == "youtu.be" {
        let segment = url.path_segments()?.next()?.trim();
        return (!segment.is_empty()).then(|| segment.to_string());
    }

    if host != "youtube.com" && !host.ends_with(".youtube.com") {
        return None;
    }

    if url.path().starts_with("/watch") {
        return url
            .query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.trim().to_string())
            .filter(|value| !value.is_empty());
    }

    let mut segments = url.path_segments()?;
    let kind = segments.next().unwrap_or("");
    let id = segments.next().unwrap_or("").trim();
    if matches!(kind, "embed" | "shorts" | "live" | "v") && !id.is_empty() {
        return Some(id.to_string());
    }

    None
}

fn extract_innertube_api_key(html: &str, video_id: &str) -> Result<String, SourceError> {
    if html.contains("class=\"g-recaptcha\"") {
        return Err(SourceError::RequestBlocked(video_id.to_string()));
    }

    let re = Regex::new(r#""INNERTUBE_API_KEY":\s*"([a-zA-Z0-9_-]+)""#).map_err(|e| SourceError::Unparsable {
        video_id: video_id.to_string(),
        detail: e.to_string(),
    })?;

    re.captures(html)
        .and_then(|captures| captures.get(1))
        .map(|key| key.as_str().to_string())
        .ok_or_else(|| SourceError::Unparsable {
            video_id: video_id.to_string(),
            detail: "INNERTUBE_API_KEY not found in watch page".to_string(),
        })
}

fn extract_consent_value(html: &str) -> Option<String> {
    let re = Regex::new(r#"name="v" value="(.*?)""#).ok()?;
    re.captures(html)
        .and_then(|captures| captures.get(1))
        .map(|value| value.as_str().to_string())
}

fn assert_playability(video_id: &str, player: &Value) -> Result<(), SourceError> {
    let Some(playability) = player.get("playabilityStatus") else {
        return Ok(());
    };

    let status = playability["status"].as_str().unwrap_or("");
    if status == "OK" {
        return Ok(());
    }

    let reason = playability["reason"].as_str().unwrap_or("").to_string();

    match status {
        "ERROR" if reason.contains("unavailable") => {
            Err(SourceError::VideoUnavailable(video_id.to_string()))
        }
        "LOGIN_REQUIRED" if reason.contains("not a bot") => {
            Err(SourceError::RequestBlocked(video_id.to_string()))
        }
        _ => Err(SourceError::VideoUnplayable {
            video_id: video_id.to_string(),
            reason: if reason.is_empty() { status.to_string() } else { reason },
        }),
    }
}

/// Manually created tracks first, then generated ones, each in upstream order
fn parse_caption_tracks(video_id: &str, player: &Value) -> Result<Vec<TrackInfo>, SourceError> {
    let renderer = player
        .get("captions")
        .and_then(|captions| captions.get("playerCaptionsTracklistRenderer"))
        .ok_or_else(|| SourceError::TranscriptsDisabled(video_id.to_string()))?;

    let default_index = renderer["audioTracks"][0]["defaultCaptionTrackIndex"].as_u64();

    let mut manual: Vec<TrackInfo> = Vec::new();
    let mut generated: Vec<TrackInfo> = Vec::new();

    let caption_tracks = renderer["captionTracks"].as_array().map(Vec::as_slice).unwrap_or(&[]);
    for (index, caption) in caption_tracks.iter().enumerate() {
        let (Some(code), Some(base_url)) = (caption["languageCode"].as_str(), caption["baseUrl"].as_str()) else {
            continue;
        };

        let is_generated = caption["kind"].as_str() == Some("asr");
        let group = if is_generated { &mut generated } else { &mut manual };
        if group.iter().any(|info| info.track.language_code == code) {
            continue;
        }

        let language = caption["name"]["runs"][0]["text"]
            .as_str()
            .or_else(|| caption["name"]["simpleText"].as_str())
            .map(str::to_string);

        group.push(TrackInfo {
            track: CaptionTrack {
                language_code: code.to_string(),
                language,
                is_default: default_index == Some(index as u64),
                is_generated,
            },
            base_url: base_url.replace("&fmt=srv3", ""),
        });
    }

    manual.extend(generated);
    if manual.is_empty() {
        return Err(SourceError::TranscriptsDisabled(video_id.to_string()));
    }

    Ok(manual)
}

/// First language with a track wins; manual tracks beat generated ones for the same code
fn select_track<'a>(tracks: &'a [TrackInfo], languages: &[String]) -> Option<&'a TrackInfo> {
    languages.iter().find_map(|code| {
        tracks
            .iter()
            .filter(|info| &info.track.language_code == code)
            .min_by_key(|info| info.track.is_generated)
    })
}

fn caption_url(base_url: &str) -> String {
    format!("{}&fmt=json3", base_url)
}

#[derive(Debug, Deserialize)]
struct Json3Captions {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Json3Event {
    #[serde(default)]
    t_start_ms: f64,
    #[serde(default)]
    d_duration_ms: f64,
    segs: Option<Vec<Json3Segment>>,
}

#[derive(Debug, Deserialize)]
struct Json3Segment {
    #[serde(default)]
    utf8: String,
}

fn parse_json3(video_id: &str, body: &str) -> Result<Vec<CaptionEntry>, SourceError> {
    let captions: Json3Captions = serde_json::from_str(body).map_err(|e| SourceError::Unparsable {
        video_id: video_id.to_string(),
        detail: format!("caption track is not json3: {}", e),
    })?;

    let entries = captions
        .events
        .into_iter()
        .filter_map(|event| {
            let text: String = event.segs?.into_iter().map(|seg| seg.utf8).collect();
            let text = text.trim();
            if text.is_empty() {
                return None;
            }
            Some(CaptionEntry::new(
                text,
                event.t_start_ms / 1000.0,
                event.d_duration_ms / 1000.0,
            ))
        })
        .collect();

    Ok(entries)
}
