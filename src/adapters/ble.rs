//! BLE remote-write adapter.
//!
//! Implements [`RemoteLinkPort`]: a single GATT service with one
//! read/write characteristic through which a phone pushes readings (or an
//! `HH:MM` time while the device is in Set Time mode).
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: Bluedroid GATT server via raw `esp_idf_svc::sys` calls.
//! - **all other targets**: simulation stubs for host-side tests.
//!
//! ## GATT Service Layout
//!
//! | Item           | UUID                                   | Perms      |
//! |----------------|----------------------------------------|------------|
//! | Service        | `4fafc101-1fb5-459e-8fcc-c5c9c331914b` |            |
//! | Reading        | `beb5483e-36e1-4688-b7f5-ea07361b26a8` | Read+Write |
//!
//! The characteristic's read value starts as the unit label.  Every write is
//! copied into [`MAILBOX`] and announced with `Event::RemoteWrite`; the main
//! loop takes it from there.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use heapless::Vec;
use log::{info, warn};

use crate::app::ports::RemoteLinkPort;
use crate::events::{EVENTS, Event, EventQueue};

// ───────────────────────────────────────────────────────────────
// Constants
// ───────────────────────────────────────────────────────────────

pub const SERVICE_UUID: u128 = 0x4faf_c101_1fb5_459e_8fcc_c5c9_c331_914b;
pub const CHAR_READING_UUID: u128 = 0xbeb5_483e_36e1_4688_b7f5_ea07_361b_26a8;

/// Largest write the mailbox keeps; anything longer is truncated and will
/// fail the core's length checks.
pub const MAILBOX_CAP: usize = 32;

// ───────────────────────────────────────────────────────────────
// Remote-write mailbox (GATT task → main loop)
// ───────────────────────────────────────────────────────────────

/// One write as it arrived over the air.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteWrite {
    bytes: Vec<u8, MAILBOX_CAP>,
    original_len: usize,
}

impl RemoteWrite {
    pub fn payload(&self) -> &[u8] {
        &self.bytes
    }

    /// Length on the wire, before any truncation.
    pub fn original_len(&self) -> usize {
        self.original_len
    }

    pub fn truncated(&self) -> bool {
        self.original_len > self.bytes.len()
    }
}

/// Single-slot, last-writer-wins mailbox.
///
/// The GATT callback runs in the Bluedroid task and may preempt the main
/// loop at any point, so the slot is guarded by a critical section.
pub struct RemoteMailbox {
    slot: Mutex<CriticalSectionRawMutex, RefCell<Option<RemoteWrite>>>,
}

/// Mailbox shared by the GATT callback and the main loop.
pub static MAILBOX: RemoteMailbox = RemoteMailbox::new();

impl Default for RemoteMailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteMailbox {
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(RefCell::new(None)),
        }
    }

    /// Store a write, replacing any unread one.  Returns `true` if an
    /// unread write was overwritten.
    pub fn post(&self, data: &[u8]) -> bool {
        let keep = data.len().min(MAILBOX_CAP);
        let mut bytes = Vec::new();
        let copied = bytes.extend_from_slice(&data[..keep]);
        debug_assert!(copied.is_ok(), "keep never exceeds the mailbox capacity");
        let write = RemoteWrite {
            bytes,
            original_len: data.len(),
        };
        self.slot
            .lock(|slot| slot.borrow_mut().replace(write))
            .is_some()
    }

    /// Take the pending write, if any.
    pub fn take(&self) -> Option<RemoteWrite> {
        let write = self.slot.lock(|slot| slot.borrow_mut().take())?;
        if write.truncated() {
            warn!(
                "BLE: write of {} bytes truncated to {}",
                write.original_len,
                write.bytes.len()
            );
        }
        Some(write)
    }

    pub fn is_empty(&self) -> bool {
        self.slot.lock(|slot| slot.borrow().is_none())
    }
}

/// GATT write entry point: park the bytes and wake the main loop.
pub fn on_remote_write(data: &[u8]) {
    deliver_write(&MAILBOX, &EVENTS, data);
}

/// Park `data` in `mailbox` and announce it on `queue`.  A write that
/// replaces an unread one is already announced, so it queues nothing.
pub fn deliver_write(mailbox: &RemoteMailbox, queue: &EventQueue, data: &[u8]) {
    if mailbox.post(data) {
        warn!("BLE: unread write replaced by a newer one");
        return;
    }
    if !queue.push(Event::RemoteWrite) {
        warn!("BLE: event queue full, write left for the loop sweep");
    }
}

// ───────────────────────────────────────────────────────────────
// BLE state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BleState {
    Idle,
    Advertising,
    Failed,
}

// ── ESP-IDF BLE static state ──────────────────────────────────
//
// Bluedroid callbacks are C function pointers that cannot capture Rust
// closures.  These atomics bridge the callback context to the adapter.

#[cfg(target_os = "espidf")]
use core::sync::atomic::{AtomicU32, Ordering as AtomicOrdering};

#[cfg(target_os = "espidf")]
static BLE_READING_CHAR_HANDLE: AtomicU32 = AtomicU32::new(0);

/// Initial characteristic value, copied into the attribute table by the
/// stack when the characteristic is added.
#[cfg(target_os = "espidf")]
static BLE_UNIT_LABEL: Mutex<CriticalSectionRawMutex, RefCell<heapless::String<32>>> =
    Mutex::new(RefCell::new(heapless::String::new()));

#[cfg(target_os = "espidf")]
fn uuid128_to_esp(uuid: u128) -> esp_idf_svc::sys::esp_bt_uuid_t {
    // SAFETY: esp_bt_uuid_t is a plain C struct; all-zero is a valid value.
    let mut t: esp_idf_svc::sys::esp_bt_uuid_t = unsafe { core::mem::zeroed() };
    t.len = 16;
    t.uuid.uuid128 = uuid.to_le_bytes();
    t
}

#[cfg(target_os = "espidf")]
fn adv_params() -> esp_idf_svc::sys::esp_ble_adv_params_t {
    use esp_idf_svc::sys::*;
    esp_ble_adv_params_t {
        adv_int_min: 0x20,
        adv_int_max: 0x40,
        adv_type: esp_ble_adv_type_t_ADV_TYPE_IND,
        own_addr_type: esp_ble_addr_type_t_BLE_ADDR_TYPE_PUBLIC,
        channel_map: esp_ble_adv_channel_t_ADV_CHNL_ALL,
        adv_filter_policy: esp_ble_adv_filter_t_ADV_FILTER_ALLOW_SCAN_ANY_CON_ANY,
        // SAFETY: remaining fields (peer address) are plain data.
        ..unsafe { core::mem::zeroed() }
    }
}

#[cfg(target_os = "espidf")]
fn start_advertising() {
    let mut params = adv_params();
    // SAFETY: params lives for the call; the stack copies it.
    unsafe {
        esp_idf_svc::sys::esp_ble_gap_start_advertising(&mut params);
    }
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn ble_gap_event_handler(
    event: esp_idf_svc::sys::esp_gap_ble_cb_event_t,
    _param: *mut esp_idf_svc::sys::esp_ble_gap_cb_param_t,
) {
    use esp_idf_svc::sys::*;
    match event {
        esp_gap_ble_cb_event_t_ESP_GAP_BLE_ADV_DATA_SET_COMPLETE_EVT => {
            start_advertising();
        }
        esp_gap_ble_cb_event_t_ESP_GAP_BLE_ADV_START_COMPLETE_EVT => {
            log::info!("BLE GAP: advertising started");
        }
        esp_gap_ble_cb_event_t_ESP_GAP_BLE_ADV_STOP_COMPLETE_EVT => {
            log::info!("BLE GAP: advertising stopped");
        }
        _ => {}
    }
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn ble_gatts_event_handler(
    event: esp_idf_svc::sys::esp_gatts_cb_event_t,
    gatts_if: esp_idf_svc::sys::esp_gatt_if_t,
    param: *mut esp_idf_svc::sys::esp_ble_gatts_cb_param_t,
) {
    use esp_idf_svc::sys::*;

    match event {
        esp_gatts_cb_event_t_ESP_GATTS_REG_EVT => {
            log::info!("BLE GATTS: app registered (if={})", gatts_if);
            let mut svc_id = esp_gatt_srvc_id_t {
                id: esp_gatt_id_t {
                    uuid: uuid128_to_esp(SERVICE_UUID),
                    inst_id: 0,
                },
                is_primary: true,
            };
            // Service declaration + characteristic declaration + value.
            unsafe { esp_ble_gatts_create_service(gatts_if, &mut svc_id, 4) };
        }
        esp_gatts_cb_event_t_ESP_GATTS_CREATE_EVT => {
            let svc_handle = unsafe { (*param).create.service_handle };
            log::info!("BLE GATTS: service created (handle={})", svc_handle);
            unsafe { esp_ble_gatts_start_service(svc_handle) };

            let mut label = BLE_UNIT_LABEL.lock(|l| l.borrow().clone());
            let mut char_uuid = uuid128_to_esp(CHAR_READING_UUID);
            let mut value = esp_attr_value_t {
                attr_max_len: 32,
                attr_len: label.len() as u16,
                // SAFETY: the stack copies the value before returning.
                attr_value: unsafe { label.as_mut_vec().as_mut_ptr() },
            };
            let mut control = esp_attr_control_t {
                auto_rsp: ESP_GATT_AUTO_RSP as u8,
            };
            unsafe {
                esp_ble_gatts_add_char(
                    svc_handle,
                    &mut char_uuid,
                    (ESP_GATT_PERM_READ | ESP_GATT_PERM_WRITE) as esp_gatt_perm_t,
                    (ESP_GATT_CHAR_PROP_BIT_READ | ESP_GATT_CHAR_PROP_BIT_WRITE)
                        as esp_gatt_char_prop_t,
                    &mut value,
                    &mut control,
                );
            }
        }
        esp_gatts_cb_event_t_ESP_GATTS_ADD_CHAR_EVT => {
            let handle = unsafe { (*param).add_char.attr_handle };
            BLE_READING_CHAR_HANDLE.store(u32::from(handle), AtomicOrdering::Relaxed);
            log::info!("BLE GATTS: reading char (handle={})", handle);
        }
        esp_gatts_cb_event_t_ESP_GATTS_CONNECT_EVT => {
            let p = unsafe { &(*param).connect };
            log::info!("BLE GATTS: client connected (conn_id={})", p.conn_id);
        }
        esp_gatts_cb_event_t_ESP_GATTS_DISCONNECT_EVT => {
            log::info!("BLE GATTS: client disconnected, advertising again");
            start_advertising();
        }
        esp_gatts_cb_event_t_ESP_GATTS_WRITE_EVT => {
            let p = unsafe { &(*param).write };
            if u32::from(p.handle) == BLE_READING_CHAR_HANDLE.load(AtomicOrdering::Relaxed) {
                // SAFETY: Bluedroid guarantees `value` points at `len` bytes
                // for the duration of the callback.
                let data = unsafe { core::slice::from_raw_parts(p.value, usize::from(p.len)) };
                on_remote_write(data);
            }
        }
        _ => {}
    }
}

// ───────────────────────────────────────────────────────────────
// BLE adapter
// ───────────────────────────────────────────────────────────────

pub struct BleAdapter {
    state: BleState,
    device_name: heapless::String<24>,
    unit_label: heapless::String<32>,
}

impl BleAdapter {
    pub fn new(device_name: heapless::String<24>, unit_label: heapless::String<32>) -> Self {
        Self {
            state: BleState::Idle,
            device_name,
            unit_label,
        }
    }

    pub fn state(&self) -> BleState {
        self.state
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Bring the stack up and start advertising.
    pub fn start(&mut self) {
        info!("BLE: starting advertising as '{}'", self.device_name);
        self.state = if self.platform_start() {
            BleState::Advertising
        } else {
            BleState::Failed
        };
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_start(&mut self) -> bool {
        use esp_idf_svc::sys::*;

        let label = self.unit_label.clone();
        BLE_UNIT_LABEL.lock(|l| *l.borrow_mut() = label);

        // SAFETY: called once from the main task before the event loop.
        unsafe {
            // BLE-only: release classic BT memory.
            esp_bt_controller_mem_release(esp_bt_mode_t_ESP_BT_MODE_CLASSIC_BT);

            let mut bt_cfg = esp_bt_controller_config_t::default();
            let ret = esp_bt_controller_init(&mut bt_cfg);
            if ret != ESP_OK {
                log::error!("BLE: bt_controller_init failed ({})", ret);
                return false;
            }
            let ret = esp_bt_controller_enable(esp_bt_mode_t_ESP_BT_MODE_BLE);
            if ret != ESP_OK {
                log::error!("BLE: bt_controller_enable failed ({})", ret);
                return false;
            }
            let ret = esp_bluedroid_init();
            if ret != ESP_OK {
                log::error!("BLE: bluedroid_init failed ({})", ret);
                return false;
            }
            let ret = esp_bluedroid_enable();
            if ret != ESP_OK {
                log::error!("BLE: bluedroid_enable failed ({})", ret);
                return false;
            }

            esp_ble_gap_register_callback(Some(ble_gap_event_handler));
            esp_ble_gatts_register_callback(Some(ble_gatts_event_handler));
            esp_ble_gatts_app_register(0);

            let mut name = heapless::Vec::<u8, 25>::new();
            let _ = name.extend_from_slice(self.device_name.as_bytes());
            let _ = name.push(0);
            esp_ble_gap_set_device_name(name.as_ptr().cast());

            // Advertising starts from the GAP handler once the data is set.
            let mut adv_data = esp_ble_adv_data_t {
                set_scan_rsp: false,
                include_name: true,
                include_txpower: false,
                flag: (ESP_BLE_ADV_FLAG_GEN_DISC | ESP_BLE_ADV_FLAG_BREDR_NOT_SPT) as u8,
                ..core::mem::zeroed()
            };
            esp_ble_gap_config_adv_data(&mut adv_data);
        }
        info!(
            "BLE(espidf): Bluedroid up, advertising as '{}'",
            self.device_name
        );
        true
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_start(&mut self) -> bool {
        info!(
            "BLE(sim): advertising '{}' (service {:032x}, initial value '{}')",
            self.device_name, SERVICE_UUID, self.unit_label
        );
        true
    }

    #[cfg(target_os = "espidf")]
    fn platform_restart_advertising(&mut self) {
        start_advertising();
        info!("BLE(espidf): advertising restarted");
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_restart_advertising(&mut self) {
        info!("BLE(sim): advertising restarted");
    }
}

// ───────────────────────────────────────────────────────────────
// RemoteLinkPort implementation
// ───────────────────────────────────────────────────────────────

impl RemoteLinkPort for BleAdapter {
    fn restart_advertising(&mut self) {
        if self.state == BleState::Failed || self.state == BleState::Idle {
            warn!("BLE: restart requested while {:?}, starting stack", self.state);
            self.start();
            return;
        }
        self.platform_restart_advertising();
        self.state = BleState::Advertising;
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
