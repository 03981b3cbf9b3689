//! Live balance dashboard.

use axum::response::Html;

use super::layout;

const TEMPLATE: &str = r#"
        <div class="card">
            <span class="card-title">Portfolio Value</span>
            <div class="card-value" id="portfolioValue">$--</div>
            <div class="muted">
                <span class="status-dot" id="statusDot"></span>
                <span id="statusText">Connecting...</span>
                &middot; <span id="updatedAt">never updated</span>
            </div>
        </div>
"#;

const SCRIPT: &str = r"
const RECONNECT_MAX_MS = 10000;

let lastValue = null;
let reconnectDelay = 500;

function formatUSD(value) {
    return value.toLocaleString('en-US', { style: 'currency', currency: 'USD' });
}

function setStatus(live, text) {
    document.getElementById('statusDot').classList.toggle('live', live);
    document.getElementById('statusText').textContent = text;
}

function render(value, timestamp) {
    const el = document.getElementById('portfolioValue');
    el.textContent = formatUSD(value);
    el.classList.remove('up', 'down');
    if (lastValue !== null && value !== lastValue) {
        el.classList.add(value > lastValue ? 'up' : 'down');
    }
    lastValue = value;
    const at = timestamp ? new Date(timestamp) : new Date();
    document.getElementById('updatedAt').textContent = 'updated ' + at.toLocaleTimeString();
}

function connect() {
    const scheme = location.protocol === 'https:' ? 'wss' : 'ws';
    const ws = new WebSocket(`${scheme}://${location.host}/ws`);

    ws.onopen = () => {
        reconnectDelay = 500;
        setStatus(true, 'Live');
    };

    ws.onmessage = (msg) => {
        let event;
        try {
            event = JSON.parse(msg.data);
        } catch (e) {
            console.error('Bad message:', e);
            return;
        }
        if (event.type === 'update' && event.data) {
            render(event.data.portfolio_value, event.timestamp);
        }
    };

    ws.onclose = () => {
        setStatus(false, 'Reconnecting...');
        setTimeout(connect, reconnectDelay);
        reconnectDelay = Math.min(reconnectDelay * 2, RECONNECT_MAX_MS);
    };
}

connect();
";

/// GET /
pub async fn dashboard_page() -> Html<String> {
    Html(layout("Portfolio Dashboard", TEMPLATE, SCRIPT))
}
