//! Engine-wide settings (`advancedsettings.xml`).

use super::xml::XmlWriter;
use serde::{Deserialize, Serialize};

/// Buffering, rendering, audio-sync and repaint parameters for the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancedSettings {
    pub network: NetworkSettings,
    pub video: VideoSettings,
    pub audio: AudioSettings,
    pub gui: GuiSettings,
}

/// Stream cache settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSettings {
    /// 1 buffers all filesystems, including network ones.
    pub buffer_mode: u8,
    /// In-memory cache size in bytes.
    pub cache_mem_buffer_size: u64,
    pub read_buffer_factor: f64,
    /// Seconds.
    pub curl_client_timeout: u32,
    /// Seconds.
    pub curl_low_speed_time: u32,
    pub curl_retries: u32,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            buffer_mode: 1,
            cache_mem_buffer_size: 256 * 1024 * 1024,
            read_buffer_factor: 4.0,
            curl_client_timeout: 30,
            curl_low_speed_time: 20,
            curl_retries: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoSettings {
    /// `force:gl` pins the GPU rendering path.
    pub render_method: String,
    /// Seconds.
    pub pause_after_refresh_change: f64,
    pub sync_type: u8,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            render_method: "force:gl".to_string(),
            pause_after_refresh_change: 0.10,
            sync_type: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// 0 disables audio resync by resampling.
    pub resample: u8,
    /// Seconds.
    pub latency: f64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            resample: 0,
            latency: 0.08,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuiSettings {
    /// Repaint-region algorithm.
    pub algorithm_dirty_regions: u8,
    pub visualize_dirty_regions: bool,
}

impl Default for GuiSettings {
    fn default() -> Self {
        Self {
            algorithm_dirty_regions: 3,
            visualize_dirty_regions: false,
        }
    }
}

impl Default for AdvancedSettings {
    fn default() -> Self {
        Self {
            network: NetworkSettings::default(),
            video: VideoSettings::default(),
            audio: AudioSettings::default(),
            gui: GuiSettings::default(),
        }
    }
}

impl AdvancedSettings {
    /// Renders the document.
    pub fn render(&self) -> String {
        let net = &self.network;
        let video = &self.video;
        let audio = &self.audio;
        let gui = &self.gui;

        let mut w = XmlWriter::new();
        w.open("advancedsettings", &[]);

        w.open("network", &[])
            .element("buffermode", &[], &net.buffer_mode.to_string())
            .element("cachemembuffersize", &[], &net.cache_mem_buffer_size.to_string())
            .element("readbufferfactor", &[], &format!("{:.1}", net.read_buffer_factor))
            .element("curlclienttimeout", &[], &net.curl_client_timeout.to_string())
            .element("curllowspeedtime", &[], &net.curl_low_speed_time.to_string())
            .element("curlretries", &[], &net.curl_retries.to_string())
            .close("network");

        w.open("video", &[])
            .element("rendermethod", &[], &video.render_method)
            .element(
                "pauseafterrefreshchange",
                &[],
                &format!("{:.2}", video.pause_after_refresh_change),
            )
            .element("synctype", &[], &video.sync_type.to_string())
            .close("video");

        w.open("audio", &[])
            .element("resample", &[], &audio.resample.to_string())
            .element("latency", &[], &format!("{:.2}", audio.latency))
            .close("audio");

        w.open("gui", &[])
            .element("algorithmdirtyregions", &[], &gui.algorithm_dirty_regions.to_string())
            .element("visualizedirtyregions", &[], &gui.visualize_dirty_regions.to_string())
            .close("gui");

        w.close("advancedsettings");
        w.finish()
    }
}
